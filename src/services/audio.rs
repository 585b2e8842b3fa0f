//! Audible cue played when a countdown finishes

use tracing::{debug, warn};

/// Something that can play the finish cue. Implementations may block for
/// the length of the sound.
pub trait AudioCue: Send + Sync {
    fn play(&self) -> Result<(), String>;
}

/// Cue used when sound is disabled or unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&self) -> Result<(), String> {
        debug!("Audio cue skipped (silent)");
        Ok(())
    }
}

/// One second 800 Hz sine beep through the default output device
#[cfg(feature = "sound")]
#[derive(Debug, Clone, Copy)]
pub struct BeepCue {
    pub frequency: f32,
    pub volume: f32,
    pub length: std::time::Duration,
}

#[cfg(feature = "sound")]
impl Default for BeepCue {
    fn default() -> Self {
        Self {
            frequency: 800.0,
            volume: 0.3,
            length: std::time::Duration::from_secs(1),
        }
    }
}

#[cfg(feature = "sound")]
impl AudioCue for BeepCue {
    fn play(&self) -> Result<(), String> {
        use rodio::{source::SineWave, OutputStream, Sink, Source};

        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| format!("No audio output device: {}", e))?;
        let sink = Sink::try_new(&handle).map_err(|e| format!("Failed to open audio sink: {}", e))?;

        let tone = SineWave::new(self.frequency)
            .take_duration(self.length)
            .fade_in(std::time::Duration::from_millis(10))
            .amplify(self.volume.clamp(0.0, 1.0));
        sink.append(tone);
        sink.sleep_until_end();

        debug!("Played {} Hz finish cue", self.frequency);
        Ok(())
    }
}

/// Pick the cue for this build. Without the `sound` feature, or when muted,
/// the cue is silent.
pub fn default_cue(muted: bool) -> Box<dyn AudioCue> {
    if muted {
        return Box::new(SilentCue);
    }
    device_cue()
}

#[cfg(feature = "sound")]
fn device_cue() -> Box<dyn AudioCue> {
    Box::new(BeepCue::default())
}

#[cfg(not(feature = "sound"))]
fn device_cue() -> Box<dyn AudioCue> {
    debug!("Built without sound support, finish cue is silent");
    Box::new(SilentCue)
}

/// Play the cue, logging instead of failing
pub fn play_quietly(cue: &dyn AudioCue) {
    if let Err(e) = cue.play() {
        warn!("Finish cue unavailable: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDevice;

    impl AudioCue for NoDevice {
        fn play(&self) -> Result<(), String> {
            Err("no device".to_string())
        }
    }

    #[test]
    fn test_missing_device_degrades_silently() {
        play_quietly(&NoDevice);
        play_quietly(&SilentCue);
    }

    #[test]
    fn test_muted_cue_is_silent() {
        assert!(default_cue(true).play().is_ok());
    }
}
