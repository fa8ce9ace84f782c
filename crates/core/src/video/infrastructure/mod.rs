pub mod ffmpeg_frame_source;
