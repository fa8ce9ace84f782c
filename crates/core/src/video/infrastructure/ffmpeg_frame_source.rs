use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameSource, SourceMetadata};

/// Decodes frames via ffmpeg-next (libavformat + libavcodec) into RGB24.
///
/// Anything libavformat can open works as a URI: a file path, a network
/// stream, or a capture device written as `<device-format>:<target>`
/// (e.g. `v4l2:/dev/video0`, `avfoundation:0`).
pub struct FfmpegFrameSource {
    state: Option<Decoding>,
}

// Safety: the source is moved into the detection loop and only ever used
// from that one thread; ffmpeg's raw pointers are never shared.
unsafe impl Send for FfmpegFrameSource {}

struct Decoding {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&mut self, uri: &str) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let ictx = open_input(uri)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| format!("No video stream in {uri}"))?;
        let stream_index = stream.index();

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.state = Some(Decoding {
            ictx,
            decoder,
            scaler,
            width,
            height,
            stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        });

        Ok(SourceMetadata { width, height, fps })
    }

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        match self.state.as_mut() {
            Some(state) => state.next_frame(),
            None => Some(Err("FfmpegFrameSource: not opened".into())),
        }
    }

    fn close(&mut self) {
        self.state = None;
    }
}

impl Decoding {
    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        if self.done {
            return None;
        }
        if let Some(result) = self.try_receive() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable packet: {e}");
                continue;
            }
            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }

    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }

        let pixels = packed_rgb(&rgb, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

fn open_input(
    uri: &str,
) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
    if let Some((device, target)) = split_device_uri(uri) {
        // Device names may carry aliases, e.g. "video4linux2,v4l2".
        if let Some(format) = ffmpeg_next::device::input::video()
            .find(|f| f.name().split(',').any(|alias| alias == device))
        {
            log::debug!("Opening capture device {target} via {device}");
            let ctx = ffmpeg_next::format::open_with(
                target,
                &ffmpeg_next::format::Format::Input(format),
                ffmpeg_next::Dictionary::new(),
            )?;
            return Ok(ctx.input());
        }
    }
    Ok(ffmpeg_next::format::input(uri)?)
}

/// Splits `<device-format>:<target>`. URLs (`scheme://`) and bare paths
/// are not device URIs.
fn split_device_uri(uri: &str) -> Option<(&str, &str)> {
    let (device, target) = uri.split_once(':')?;
    let valid_name = device.len() > 1
        && device
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name || target.is_empty() || target.starts_with("//") {
        return None;
    }
    Some((device, target))
}

/// Copies an RGB24 frame into a tightly packed buffer, dropping row padding.
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Encodes `num_frames` flat gray frames as MPEG-4.
    fn write_test_video(path: &Path, num_frames: usize, width: u32, height: u32) {
        let fps = 30;
        ffmpeg_next::init().unwrap();
        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut enc = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        enc.set_width(width);
        enc.set_height(height);
        enc.set_format(ffmpeg_next::format::Pixel::YUV420P);
        enc.set_time_base(ffmpeg_next::Rational(1, fps));
        enc.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
        if global_header {
            enc.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let mut encoder = enc.open_with(ffmpeg_next::Dictionary::new()).unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();
        let time_base = octx.stream(0).unwrap().time_base();

        for i in 0..num_frames {
            let mut yuv = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::YUV420P,
                width,
                height,
            );
            for plane in 0..3 {
                let value = if plane == 0 { (i * 40 % 256) as u8 } else { 128 };
                yuv.data_mut(plane).fill(value);
            }
            yuv.set_pts(Some(i as i64));
            encoder.send_frame(&yuv).unwrap();

            let mut packet = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(0);
                packet.rescale_ts(ffmpeg_next::Rational(1, fps), time_base);
                packet.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut packet = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(ffmpeg_next::Rational(1, fps), time_base);
            packet.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }

    fn video(dir: &Path, num_frames: usize) -> String {
        let path = dir.join("clip.mp4");
        write_test_video(&path, num_frames, 160, 120);
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_open_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let uri = video(dir.path(), 3);
        let mut source = FfmpegFrameSource::new();
        let meta = source.open(&uri).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
        assert!(meta.fps > 0.0);
    }

    #[test]
    fn test_open_missing_file_is_error() {
        let mut source = FfmpegFrameSource::new();
        assert!(source.open("/nonexistent/clip.mp4").is_err());
    }

    #[test]
    fn test_next_frame_before_open_is_error() {
        let mut source = FfmpegFrameSource::new();
        assert!(matches!(source.next_frame(), Some(Err(_))));
    }

    #[test]
    fn test_yields_every_frame_then_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let uri = video(dir.path(), 5);
        let mut source = FfmpegFrameSource::new();
        source.open(&uri).unwrap();

        let mut frames = Vec::new();
        while let Some(frame) = source.next_frame() {
            frames.push(frame.unwrap());
        }
        assert_eq!(frames.len(), 5);
        for (i, f) in frames.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(f.channels(), 3);
            assert_eq!(f.data().len(), 160 * 120 * 3);
        }
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_close_is_idempotent_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let uri = video(dir.path(), 1);
        let mut source = FfmpegFrameSource::new();
        source.open(&uri).unwrap();
        source.close();
        source.close();
        assert!(matches!(source.next_frame(), Some(Err(_))));
    }

    #[test]
    fn test_split_device_uri() {
        assert_eq!(
            split_device_uri("v4l2:/dev/video0"),
            Some(("v4l2", "/dev/video0"))
        );
        assert_eq!(split_device_uri("avfoundation:0"), Some(("avfoundation", "0")));
        assert_eq!(split_device_uri("rtsp://cam.local/stream"), None);
        assert_eq!(split_device_uri("C:\\videos\\clip.mp4"), None);
        assert_eq!(split_device_uri("/tmp/clip.mp4"), None);
        assert_eq!(split_device_uri("v4l2:"), None);
    }
}
