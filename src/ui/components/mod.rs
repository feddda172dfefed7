mod input;
mod now_playing;
mod spinner;

pub use input::Input;
pub use now_playing::NowPlaying;
pub use spinner::Spinner;
