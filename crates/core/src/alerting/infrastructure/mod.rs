pub mod command_playback;
