#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Cursor, Write};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use crate::image_pipeline::bridge::pipeline::ProcessingBridge;
    use crate::image_pipeline::common::error::{BridgeError, Result};
    use crate::image_pipeline::decode::{ColorLayout, ImageDecoder, PixelBuffer};
    use crate::image_pipeline::encode::{BridgeConfig, ImageEncoder, OutputFormat, OutputTarget};
    use crate::image_pipeline::grayscale::{GrayImageData, GrayscaleConverter, LumaConverter};
    use crate::image_pipeline::runtime::VisionRuntime;

    struct MockDecoder {
        should_fail: bool,
        mock_data: Option<PixelBuffer>,
    }

    impl ImageDecoder for MockDecoder {
        fn decode(&self, _data: &[u8]) -> Result<PixelBuffer> {
            if self.should_fail {
                return Err(BridgeError::DecodeFailed {
                    message: "Mock decode error".to_string(),
                    source: None,
                });
            }
            Ok(self.mock_data.clone().unwrap_or(PixelBuffer {
                width: 100,
                height: 100,
                layout: ColorLayout::Rgb,
                data: vec![0u8; 100 * 100 * 3],
            }))
        }
    }

    struct MockEncoder {
        should_fail: bool,
        written_data: Arc<Mutex<Vec<GrayImageData>>>,
    }

    impl ImageEncoder for MockEncoder {
        fn encode(&self, image: &GrayImageData, output: &mut dyn Write, _format: OutputFormat) -> Result<()> {
            if self.should_fail {
                return Err(BridgeError::EncodeOrWriteFailed {
                    message: "Mock encode error".to_string(),
                    source: None,
                });
            }
            self.written_data.lock().unwrap().push(image.clone());
            output.write_all(b"GRAY").map_err(BridgeError::encode)?;
            Ok(())
        }
    }

    fn ready_runtime() -> Arc<VisionRuntime> {
        let runtime = VisionRuntime::new();
        runtime.initialize_with(|| Ok(())).unwrap();
        Arc::new(runtime)
    }

    fn bridge(
        decoder: MockDecoder,
        encoder: MockEncoder,
        config: BridgeConfig,
    ) -> ProcessingBridge<MockDecoder, LumaConverter, MockEncoder> {
        ProcessingBridge::with_custom(decoder, LumaConverter, encoder, ready_runtime(), config)
    }

    fn ok_decoder() -> MockDecoder {
        MockDecoder { should_fail: false, mock_data: None }
    }

    fn recording_encoder() -> (MockEncoder, Arc<Mutex<Vec<GrayImageData>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        (MockEncoder { should_fail: false, written_data: written.clone() }, written)
    }

    #[test]
    fn test_successful_conversion() {
        let (encoder, written) = recording_encoder();
        let pipeline = bridge(ok_decoder(), encoder, BridgeConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(b"fake image data", &mut output);

        assert_eq!(result.unwrap(), (100, 100));
        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].data.len(), 100 * 100);
        assert_eq!(output.into_inner(), b"GRAY");
    }

    #[test]
    fn test_decoder_failure() {
        let (encoder, written) = recording_encoder();
        let pipeline = bridge(MockDecoder { should_fail: true, mock_data: None }, encoder, BridgeConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(b"fake image data", &mut output);

        assert!(matches!(result.unwrap_err(), BridgeError::DecodeFailed { .. }));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_encoder_failure() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let encoder = MockEncoder { should_fail: true, written_data: written };
        let pipeline = bridge(ok_decoder(), encoder, BridgeConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(b"fake image data", &mut output);

        assert!(matches!(result.unwrap_err(), BridgeError::EncodeOrWriteFailed { .. }));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let decoder = MockDecoder {
            should_fail: false,
            mock_data: Some(PixelBuffer { width: 0, height: 10, layout: ColorLayout::Gray, data: Vec::new() }),
        };
        let (encoder, _) = recording_encoder();
        let pipeline = bridge(decoder, encoder, BridgeConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(b"fake image data", &mut output);

        assert!(matches!(result.unwrap_err(), BridgeError::InvalidDimensions(0, 10)));
    }

    #[test]
    fn test_dimension_validation_failure() {
        let decoder = MockDecoder {
            should_fail: false,
            mock_data: Some(PixelBuffer { width: 10000, height: 10000, layout: ColorLayout::Gray, data: vec![0; 100] }),
        };
        let (encoder, _) = recording_encoder();
        let config = BridgeConfig::builder().max_dimension(Some(5000)).build();
        let pipeline = bridge(decoder, encoder, config);

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(b"fake image data", &mut output);

        assert!(matches!(result.unwrap_err(), BridgeError::InvalidDimensions(_, _)));
    }

    #[test]
    fn test_dimension_validation_disabled() {
        let decoder = MockDecoder {
            should_fail: false,
            mock_data: Some(PixelBuffer { width: 60, height: 1, layout: ColorLayout::Gray, data: vec![5; 60] }),
        };
        let (encoder, _) = recording_encoder();
        let config = BridgeConfig::builder()
            .validate_dimensions(false)
            .max_dimension(Some(50))
            .build();
        let pipeline = bridge(decoder, encoder, config);

        let mut output = Cursor::new(Vec::new());
        assert!(pipeline.convert(b"fake image data", &mut output).is_ok());
    }

    #[test]
    fn test_uninitialized_runtime_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, written) = recording_encoder();
        let pipeline = ProcessingBridge::with_custom(
            ok_decoder(),
            LumaConverter,
            encoder,
            Arc::new(VisionRuntime::new()),
            BridgeConfig::default(),
        );

        let err = pipeline.process_blocking(input.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, BridgeError::NotInitialized));
        assert!(written.lock().unwrap().is_empty());
        assert_eq!(fs::read(&input).unwrap(), b"original bytes");
    }

    #[test]
    fn test_missing_file_reports_locator() {
        let dir = tempfile::tempdir().unwrap();
        let locator = format!("file://{}", dir.path().join("missing.jpg").display());

        let (encoder, written) = recording_encoder();
        let pipeline = bridge(ok_decoder(), encoder, BridgeConfig::default());

        let err = pipeline.process_blocking(&locator).unwrap_err();
        match err {
            BridgeError::NotFound { locator: reported } => assert_eq!(reported, locator),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(written.lock().unwrap().is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_in_place_rewrite_keeps_locator_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();
        let locator = format!("file://{}", input.display());

        let (encoder, _) = recording_encoder();
        let pipeline = bridge(ok_decoder(), encoder, BridgeConfig::default());

        let processed = pipeline.process_blocking(&locator).unwrap();
        assert_eq!(processed.to_locator(), locator);
        assert_eq!(fs::read(&input).unwrap(), b"GRAY");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_decode_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, _) = recording_encoder();
        let pipeline = bridge(MockDecoder { should_fail: true, mock_data: None }, encoder, BridgeConfig::default());

        let err = pipeline.process_blocking(input.to_str().unwrap()).unwrap_err();
        assert_eq!(err.code(), "DECODE_FAILED");
        assert!(err.to_string().contains(input.to_str().unwrap()));
        assert_eq!(fs::read(&input).unwrap(), b"original bytes");
    }

    #[test]
    fn test_sibling_target_preserves_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, _) = recording_encoder();
        let config = BridgeConfig::builder()
            .target(OutputTarget::Sibling { suffix: "_gray".to_string() })
            .atomic_write(false)
            .build();
        let pipeline = bridge(ok_decoder(), encoder, config);

        let processed = pipeline.process_blocking(input.to_str().unwrap()).unwrap();
        assert_eq!(processed.path(), dir.path().join("photo_gray.jpg"));
        assert_eq!(fs::read(&input).unwrap(), b"original bytes");
        assert_eq!(fs::read(processed.path()).unwrap(), b"GRAY");
    }

    #[test]
    fn test_sibling_target_uses_format_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, _) = recording_encoder();
        let config = BridgeConfig::builder()
            .format(OutputFormat::Png)
            .target(OutputTarget::Sibling { suffix: "_gray".to_string() })
            .build();
        let pipeline = bridge(ok_decoder(), encoder, config);

        let processed = pipeline.process_blocking(input.to_str().unwrap()).unwrap();
        assert_eq!(processed.path(), dir.path().join("photo_gray.png"));
        assert!(!dir.path().join("photo_gray.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_in_place_rewrite_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo.jpg");
        let link = dir.path().join("link.jpg");
        fs::write(&photo, b"original bytes").unwrap();
        std::os::unix::fs::symlink(&photo, &link).unwrap();

        let (encoder, _) = recording_encoder();
        let pipeline = bridge(ok_decoder(), encoder, BridgeConfig::default());

        let processed = pipeline.process_blocking(link.to_str().unwrap()).unwrap();
        assert_eq!(processed.path(), link);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&photo).unwrap(), b"GRAY");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    /// Sleeps inside decode and records how many callers overlap.
    struct OverlapDecoder {
        active: AtomicUsize,
        peak: Arc<AtomicUsize>,
    }

    impl ImageDecoder for OverlapDecoder {
        fn decode(&self, _data: &[u8]) -> Result<PixelBuffer> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(PixelBuffer { width: 2, height: 2, layout: ColorLayout::Gray, data: vec![0; 4] })
        }
    }

    #[test]
    fn test_aliased_locators_share_one_lock() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(&input, b"original bytes").unwrap();

        let direct = input.to_str().unwrap().to_string();
        let dotted = dir.path().join("sub").join("..").join("photo.jpg");
        let dotted = dotted.to_str().unwrap().to_string();

        let (encoder, _) = recording_encoder();
        let peak = Arc::new(AtomicUsize::new(0));
        let decoder = OverlapDecoder { active: AtomicUsize::new(0), peak: peak.clone() };
        let pipeline = ProcessingBridge::with_custom(
            decoder,
            LumaConverter,
            encoder,
            ready_runtime(),
            BridgeConfig::default(),
        );

        thread::scope(|scope| {
            for i in 0..4 {
                let locator = if i % 2 == 0 { &direct } else { &dotted };
                let pipeline = &pipeline;
                scope.spawn(move || pipeline.process_blocking(locator).unwrap());
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(fs::read(&input).unwrap(), b"GRAY");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, _) = recording_encoder();
        let config = BridgeConfig::builder()
            .target(OutputTarget::Sibling { suffix: "/nested/out".to_string() })
            .build();
        let pipeline = bridge(ok_decoder(), encoder, config);

        let err = pipeline.process_blocking(input.to_str().unwrap()).unwrap_err();
        assert_eq!(err.code(), "ENCODE_OR_WRITE_FAILED");
        assert_eq!(fs::read(&input).unwrap(), b"original bytes");
        assert!(!Path::new(&dir.path().join("photo")).exists());
    }

    #[tokio::test]
    async fn test_submit_completes_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jpg");

        let (encoder, _) = recording_encoder();
        let pipeline = Arc::new(bridge(ok_decoder(), encoder, BridgeConfig::default()));

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        pipeline
            .submit(missing.to_str().unwrap(), move |result| {
                sink.lock().unwrap().push(result.map(|r| r.to_locator()));
            })
            .await
            .unwrap();

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], Err(BridgeError::NotFound { .. })));
    }

    struct PanickingConverter;

    impl GrayscaleConverter for PanickingConverter {
        fn convert_to_grayscale(&self, _pixels: &PixelBuffer) -> Result<GrayImageData> {
            panic!("converter blew up");
        }
    }

    #[tokio::test]
    async fn test_worker_panic_becomes_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.jpg");
        fs::write(&input, b"original bytes").unwrap();

        let (encoder, _) = recording_encoder();
        let pipeline = Arc::new(ProcessingBridge::with_custom(
            ok_decoder(),
            PanickingConverter,
            encoder,
            ready_runtime(),
            BridgeConfig::default(),
        ));

        let err = pipeline.process(input.to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.code(), "WORKER_FAILED");
        assert_eq!(fs::read(&input).unwrap(), b"original bytes");
    }
}
