use std::{
    fs,
    fs::File,
    io,
    io::BufWriter,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crossbeam_channel::Sender;
use image::imageops::FilterType;

use crate::{
    error::Error,
    util::{mkdir_if_not_exists, ICO_MAX_SIZE},
};

/// Immutable snapshot of one conversion run, taken when the user hits
/// "start". Construction validates and normalizes the inputs, so the
/// conversion loop never revisits them.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    input_paths: Vec<PathBuf>,
    output_root: PathBuf,
    sizes: Vec<u32>,
    move_original: bool,
}

impl ConversionRequest {
    /// Validates the inputs and builds a request. Sizes are de-duplicated
    /// and kept in descending order. The output root is created here;
    /// failing to do so fails the whole request, not a single item.
    pub fn new(
        input_paths: Vec<PathBuf>,
        output_root: PathBuf,
        sizes: &[u32],
        move_original: bool,
    ) -> Result<Self, Error> {
        if input_paths.is_empty() {
            return Err(Error::NoInputs);
        }
        if sizes.is_empty() {
            return Err(Error::NoSizes);
        }
        if let Some(&size) = sizes.iter().find(|&&size| size == 0) {
            return Err(Error::InvalidSize { size });
        }
        let mut sizes = sizes.to_vec();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();

        if let Err(source) = mkdir_if_not_exists(&output_root) {
            return Err(Error::OutputRootUnusable {
                path: output_root,
                source,
            });
        }

        Ok(Self {
            input_paths,
            output_root,
            sizes,
            move_original,
        })
    }

    pub fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }
}

/// Outcome of a single input image.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub input: PathBuf,
    pub generated: Vec<PathBuf>,
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Events emitted by the conversion loop, in the order they happen.
#[derive(Debug, Clone)]
pub enum ConvertEvent {
    PngWritten {
        path: PathBuf,
        size: u32,
    },
    IcoWritten {
        path: PathBuf,
        entries: usize,
    },
    /// No size in the set fit into an ICO container, so none was written.
    IcoSkipped {
        path: PathBuf,
    },
    /// The size exceeds the ICO entry limit and was left out of the
    /// container. The resized PNG is still produced.
    OversizeSkipped {
        size: u32,
    },
    OriginalMoved {
        from: PathBuf,
        to: PathBuf,
    },
    OriginalCopied {
        from: PathBuf,
        to: PathBuf,
    },
    ItemFailed {
        path: PathBuf,
        message: String,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: u8,
    },
    Cancelled {
        completed: usize,
        total: usize,
    },
    Finished {
        converted: usize,
        failed: usize,
    },
}

/// Cooperative cancellation flag, checked between items. An item that is
/// already being processed always runs to completion.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Converts the batch sequentially, in input order. Per-item failures are
/// reported through `events` and do not stop the batch.
pub fn convert(
    request: &ConversionRequest,
    cancel: &CancelToken,
    events: &Sender<ConvertEvent>,
) -> Vec<ConversionResult> {
    let total = request.input_paths.len();
    let mut results = Vec::with_capacity(total);
    let mut completed = 0;

    for input in &request.input_paths {
        if cancel.is_cancelled() {
            log::info!("conversion cancelled after {} of {} items", completed, total);
            emit(events, ConvertEvent::Cancelled { completed, total });
            return results;
        }
        let result = match convert_one(input, request, events) {
            Ok(generated) => ConversionResult {
                input: input.clone(),
                generated,
                error: None,
            },
            Err(err) => {
                log::error!("failed to convert {:?}: {}", input, err);
                emit(
                    events,
                    ConvertEvent::ItemFailed {
                        path: input.clone(),
                        message: err.to_string(),
                    },
                );
                ConversionResult {
                    input: input.clone(),
                    generated: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        results.push(result);
        completed += 1;
        emit(
            events,
            ConvertEvent::Progress {
                completed,
                total,
                percent: percent(completed, total),
            },
        );
    }

    let failed = results.iter().filter(|res| !res.is_success()).count();
    log::info!("conversion finished, {} converted, {} failed", total - failed, failed);
    emit(
        events,
        ConvertEvent::Finished {
            converted: total - failed,
            failed,
        },
    );
    results
}

/// Processes a single input image: resized PNGs, the composite ICO, and
/// the relocated or copied original. Returns the generated paths.
fn convert_one(
    input: &Path,
    request: &ConversionRequest,
    events: &Sender<ConvertEvent>,
) -> Result<Vec<PathBuf>, Error> {
    let base = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "input path has no file name")
        })?;

    // Decode before touching the filesystem, so an unreadable input leaves
    // no output directory behind.
    let img = image::open(input)?;

    let out_dir = request.output_root.join(&base);
    mkdir_if_not_exists(&out_dir)?;

    let mut generated = Vec::new();
    let mut icon_dir = ico::IconDir::new(ico::ResourceType::Icon);

    // Sizes come pre-sorted in descending order, which also gives the ICO
    // its largest-first entry layout.
    for &size in &request.sizes {
        let rgba = img.resize_exact(size, size, FilterType::Lanczos3).to_rgba8();
        let png_path = out_dir.join(format!("{}_{}.png", base, size));
        rgba.save(&png_path)?;
        log::debug!("wrote {:?}", png_path);
        emit(
            events,
            ConvertEvent::PngWritten {
                path: png_path.clone(),
                size,
            },
        );
        generated.push(png_path);

        if size <= ICO_MAX_SIZE {
            let entry = ico::IconImage::from_rgba_data(size, size, rgba.into_raw());
            icon_dir.add_entry(ico::IconDirEntry::encode(&entry)?);
        } else {
            log::warn!("size {} exceeds the ICO limit, omitting it from the icon", size);
            emit(events, ConvertEvent::OversizeSkipped { size });
        }
    }

    if icon_dir.entries().is_empty() {
        emit(
            events,
            ConvertEvent::IcoSkipped {
                path: input.to_path_buf(),
            },
        );
    } else {
        let ico_path = out_dir.join(format!("{}.ico", base));
        let writer = BufWriter::new(File::create(&ico_path)?);
        icon_dir.write(writer)?;
        log::debug!("wrote {:?}", ico_path);
        emit(
            events,
            ConvertEvent::IcoWritten {
                path: ico_path.clone(),
                entries: icon_dir.entries().len(),
            },
        );
        generated.push(ico_path);
    }

    // Copy + remove instead of rename, so moving survives filesystem
    // boundaries.
    let file_name = input.file_name().expect("checked with file_stem above");
    let dest = out_dir.join(file_name);
    fs::copy(input, &dest)?;
    if request.move_original {
        fs::remove_file(input)?;
        emit(
            events,
            ConvertEvent::OriginalMoved {
                from: input.to_path_buf(),
                to: dest.clone(),
            },
        );
    } else {
        emit(
            events,
            ConvertEvent::OriginalCopied {
                from: input.to_path_buf(),
                to: dest.clone(),
            },
        );
    }
    generated.push(dest);

    Ok(generated)
}

fn percent(completed: usize, total: usize) -> u8 {
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

// The receiver side may be gone when the shell shuts down mid-run; the
// batch still finishes the current item either way.
fn emit(events: &Sender<ConvertEvent>, event: ConvertEvent) {
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crossbeam_channel::unbounded;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    use super::*;
    use crate::error::Error;

    fn write_test_png(path: &Path, side: u32) {
        let img = ImageBuffer::from_fn(side, side, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba([255u8, 0, 0, 255])
            } else {
                Rgba([0u8, 0, 255, 128])
            }
        });
        img.save(path).unwrap();
    }

    fn run(request: &ConversionRequest) -> (Vec<ConversionResult>, Vec<ConvertEvent>) {
        run_with_token(request, &CancelToken::new())
    }

    fn run_with_token(
        request: &ConversionRequest,
        cancel: &CancelToken,
    ) -> (Vec<ConversionResult>, Vec<ConvertEvent>) {
        let (sender, receiver) = unbounded();
        let results = convert(request, cancel, &sender);
        drop(sender);
        (results, receiver.try_iter().collect())
    }

    fn progress_percents(events: &[ConvertEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                ConvertEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn produces_expected_output_layout() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let input = input_dir.path().join("sample.png");
        write_test_png(&input, 1024);

        let request = ConversionRequest::new(
            vec![input.clone()],
            output_dir.path().to_path_buf(),
            &[256, 64, 16],
            false,
        )
        .unwrap();
        let (results, _events) = run(&request);

        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());

        let out = output_dir.path().join("sample");
        for &size in &[256u32, 64, 16] {
            let png = out.join(format!("sample_{}.png", size));
            assert_eq!(image::image_dimensions(&png).unwrap(), (size, size));
        }
        let ico = ico::IconDir::read(fs::File::open(out.join("sample.ico")).unwrap()).unwrap();
        assert_eq!(ico.entries().len(), 3);
        let widths: Vec<u32> = ico.entries().iter().map(|entry| entry.width()).collect();
        assert_eq!(widths, vec![256, 64, 16]);

        // move_original = false keeps the source and adds a copy.
        assert!(input.exists());
        assert!(out.join("sample.png").exists());
    }

    #[test]
    fn move_removes_the_source() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let input = input_dir.path().join("logo.png");
        write_test_png(&input, 32);

        let request = ConversionRequest::new(
            vec![input.clone()],
            output_dir.path().to_path_buf(),
            &[16],
            true,
        )
        .unwrap();
        let (results, events) = run(&request);

        assert!(results[0].is_success());
        assert!(!input.exists());
        assert!(output_dir.path().join("logo").join("logo.png").exists());
        assert!(events
            .iter()
            .any(|event| matches!(event, ConvertEvent::OriginalMoved { .. })));
    }

    #[test]
    fn failed_decode_does_not_stop_the_batch() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let broken = input_dir.path().join("broken.png");
        fs::write(&broken, b"definitely not a png").unwrap();
        let valid = input_dir.path().join("valid.png");
        write_test_png(&valid, 64);

        let request = ConversionRequest::new(
            vec![broken.clone(), valid],
            output_dir.path().to_path_buf(),
            &[32],
            false,
        )
        .unwrap();
        let (results, events) = run(&request);

        assert_eq!(results.len(), 2);
        assert!(!results[0].is_success());
        assert!(results[1].is_success());

        // The unreadable input must not leave an output directory behind.
        assert!(!output_dir.path().join("broken").exists());
        assert!(output_dir.path().join("valid").join("valid_32.png").exists());

        let failures: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, ConvertEvent::ItemFailed { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        match failures[0] {
            ConvertEvent::ItemFailed { path, .. } => assert_eq!(path, &broken),
            _ => unreachable!(),
        }

        assert_eq!(progress_percents(&events), vec![50, 100]);
        assert!(events
            .iter()
            .any(|event| matches!(event, ConvertEvent::Finished { converted: 1, failed: 1 })));
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let mut inputs = Vec::new();
        for i in 0..3 {
            let path = input_dir.path().join(format!("img{}.png", i));
            write_test_png(&path, 24);
            inputs.push(path);
        }

        let request =
            ConversionRequest::new(inputs, output_dir.path().to_path_buf(), &[16], false).unwrap();
        let (_, events) = run(&request);

        let percents = progress_percents(&events);
        assert_eq!(percents, vec![33, 67, 100]);
        assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn request_normalizes_sizes() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let input = input_dir.path().join("a.png");
        write_test_png(&input, 16);

        let request = ConversionRequest::new(
            vec![input],
            output_dir.path().to_path_buf(),
            &[16, 256, 64, 256],
            false,
        )
        .unwrap();
        assert_eq!(request.sizes(), &[256, 64, 16]);
    }

    #[test]
    fn request_construction_is_validated() {
        let output_dir = tempdir().unwrap();
        let output_root = output_dir.path().to_path_buf();

        let err = ConversionRequest::new(Vec::new(), output_root.clone(), &[16], false);
        assert!(matches!(err, Err(Error::NoInputs)));

        let err = ConversionRequest::new(vec!["a.png".into()], output_root.clone(), &[], false);
        assert!(matches!(err, Err(Error::NoSizes)));

        let err = ConversionRequest::new(vec!["a.png".into()], output_root, &[16, 0], false);
        assert!(matches!(err, Err(Error::InvalidSize { size: 0 })));
    }

    #[test]
    fn oversize_entries_stay_out_of_the_ico() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let input = input_dir.path().join("big.png");
        write_test_png(&input, 64);

        let request = ConversionRequest::new(
            vec![input],
            output_dir.path().to_path_buf(),
            &[512, 32],
            false,
        )
        .unwrap();
        let (results, events) = run(&request);

        assert!(results[0].is_success());
        let out = output_dir.path().join("big");
        assert_eq!(
            image::image_dimensions(out.join("big_512.png")).unwrap(),
            (512, 512)
        );
        let ico = ico::IconDir::read(fs::File::open(out.join("big.ico")).unwrap()).unwrap();
        assert_eq!(ico.entries().len(), 1);
        assert_eq!(ico.entries()[0].width(), 32);
        assert!(events
            .iter()
            .any(|event| matches!(event, ConvertEvent::OversizeSkipped { size: 512 })));
    }

    #[test]
    fn cancellation_stops_before_the_next_item() {
        let input_dir = tempdir().unwrap();
        let output_dir = tempdir().unwrap();
        let input = input_dir.path().join("a.png");
        write_test_png(&input, 16);

        let request = ConversionRequest::new(
            vec![input],
            output_dir.path().to_path_buf(),
            &[16],
            false,
        )
        .unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let (results, events) = run_with_token(&request, &cancel);

        assert!(results.is_empty());
        assert!(!output_dir.path().join("a").exists());
        assert!(events
            .iter()
            .any(|event| matches!(event, ConvertEvent::Cancelled { completed: 0, total: 1 })));
        assert!(!events
            .iter()
            .any(|event| matches!(event, ConvertEvent::Finished { .. })));
    }

    #[test]
    fn conversion_is_deterministic() {
        let input_dir = tempdir().unwrap();
        let input = input_dir.path().join("icon.png");
        write_test_png(&input, 48);

        let mut outputs = Vec::new();
        for _ in 0..2 {
            let output_dir = tempdir().unwrap();
            let request = ConversionRequest::new(
                vec![input.clone()],
                output_dir.path().to_path_buf(),
                &[32, 16],
                false,
            )
            .unwrap();
            let (results, _) = run(&request);
            assert!(results[0].is_success());
            let out = output_dir.path().join("icon");
            outputs.push((
                fs::read(out.join("icon_32.png")).unwrap(),
                fs::read(out.join("icon.ico")).unwrap(),
            ));
        }
        assert_eq!(outputs[0], outputs[1]);
    }
}
