//! Sound playback with a silent fallback.
//!
//! With the `audio` feature the engine plays through `rodio`; without it, or
//! when no output device can be opened, every call is a no-op so the games
//! run unchanged. Volume math lives in [`SoundSettings`] and is pure.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GameError, Result};

// ── User-facing channels ──────────────────────────────────────────────────────

/// The four volume sliders exposed in the settings menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Music,
    Point,
    Hit,
    Shoot,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Music, Channel::Point, Channel::Hit, Channel::Shoot];

    pub fn key(self) -> &'static str {
        match self {
            Channel::Music => "music",
            Channel::Point => "point",
            Channel::Hit => "hit",
            Channel::Shoot => "shoot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Music => "Music",
            Channel::Point => "Point sound",
            Channel::Hit => "Hit sound",
            Channel::Shoot => "Shot sound",
        }
    }

    fn from_key(key: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// One value per channel. Serializes as `{"point":..,"hit":..,"shoot":..,"music":..}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSet<T> {
    pub point: T,
    pub hit: T,
    pub shoot: T,
    pub music: T,
}

impl<T: Copy> ChannelSet<T> {
    pub fn get(&self, channel: Channel) -> T {
        match channel {
            Channel::Music => self.music,
            Channel::Point => self.point,
            Channel::Hit => self.hit,
            Channel::Shoot => self.shoot,
        }
    }

    pub fn set(&mut self, channel: Channel, value: T) {
        match channel {
            Channel::Music => self.music = value,
            Channel::Point => self.point = value,
            Channel::Hit => self.hit = value,
            Channel::Shoot => self.shoot = value,
        }
    }
}

// ── Cues ──────────────────────────────────────────────────────────────────────

/// Every sound the games can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Point,
    Hit,
    Shoot,
    Explosion,
    LowLives,
    BossFinal,
    CollectStar,
    GameOver,
    LoadLevels,
    BossExplosion,
    PauseGame,
    SpaceBridge,
}

/// Which channel volume a cue is derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Base {
    Own(Channel),
    /// Loudest enabled effect channel.
    Effects,
    /// Loudest enabled effect channel, or the loudest one at all when every
    /// effect channel is switched off.
    EffectsOrAny,
    /// Loudest effect channel regardless of the on/off switches.
    Any,
}

impl Cue {
    pub fn key(self) -> &'static str {
        match self {
            Cue::Point => "point",
            Cue::Hit => "hit",
            Cue::Shoot => "shoot",
            Cue::Explosion => "explosion",
            Cue::LowLives => "low_lifes",
            Cue::BossFinal => "boss_final",
            Cue::CollectStar => "collect_star",
            Cue::GameOver => "gameover",
            Cue::LoadLevels => "load_levels",
            Cue::BossExplosion => "boss_explosion",
            Cue::PauseGame => "pause_game",
            Cue::SpaceBridge => "space_bridge",
        }
    }

    /// (volume base, boost, affected by ducking)
    fn profile(self) -> (Base, f32, bool) {
        match self {
            Cue::Point => (Base::Own(Channel::Point), 1.0, false),
            Cue::Hit => (Base::Own(Channel::Hit), 1.0, false),
            Cue::Shoot => (Base::Own(Channel::Shoot), 1.0, false),
            Cue::Explosion => (Base::EffectsOrAny, 1.0, true),
            Cue::LowLives => (Base::Any, 6.0, true),
            Cue::BossFinal => (Base::EffectsOrAny, 6.0, true),
            Cue::CollectStar => (Base::EffectsOrAny, 5.2, true),
            Cue::GameOver => (Base::Effects, 3.15, true),
            Cue::LoadLevels => (Base::EffectsOrAny, 6.0, false),
            Cue::BossExplosion => (Base::EffectsOrAny, 7.0, true),
            Cue::PauseGame => (Base::Effects, 4.0, true),
            Cue::SpaceBridge => (Base::Effects, 5.8, true),
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

const EFFECT_CHANNELS: [Channel; 3] = [Channel::Point, Channel::Hit, Channel::Shoot];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundSettings {
    pub volumes: ChannelSet<f32>,
    pub enabled: ChannelSet<bool>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        SoundSettings {
            volumes: ChannelSet { point: 0.3, hit: 0.3, shoot: 0.2, music: 0.3 },
            enabled: ChannelSet { point: true, hit: true, shoot: true, music: true },
        }
    }
}

/// Volumes are stored either as floats in `0.0..=1.0` or as integer
/// percentages in `0..=100`.
pub fn normalize_volume(value: &Value) -> Result<f32> {
    if let Some(n) = value.as_u64() {
        return if n <= 100 {
            Ok(n as f32 / 100.0)
        } else {
            Err(GameError::InvalidVolume(format!("integer {n} outside 0..=100")))
        };
    }
    if value.is_i64() {
        return Err(GameError::InvalidVolume(format!("integer {value} outside 0..=100")));
    }
    match value.as_f64() {
        Some(f) if (0.0..=1.0).contains(&f) => Ok(f as f32),
        Some(f) => Err(GameError::InvalidVolume(format!("float {f} outside 0.0..=1.0"))),
        None => Err(GameError::InvalidVolume(format!("{value} is not a number"))),
    }
}

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

impl SoundSettings {
    /// Merge the `volumes` / `sound_enabled` objects of a save file. Unknown
    /// keys and invalid values are skipped; the rest is applied.
    pub fn merge_saved(&mut self, volumes: Option<&Value>, enabled: Option<&Value>) {
        if let Some(Value::Object(map)) = volumes {
            for (key, raw) in map {
                let Some(channel) = Channel::from_key(key) else { continue };
                match normalize_volume(raw) {
                    Ok(v) => self.volumes.set(channel, v),
                    Err(e) => tracing::warn!(%key, error = %e, "ignoring saved volume"),
                }
            }
        }
        if let Some(Value::Object(map)) = enabled {
            for (key, raw) in map {
                if let (Some(channel), Some(on)) = (Channel::from_key(key), raw.as_bool()) {
                    self.enabled.set(channel, on);
                }
            }
        }
    }

    /// Volume of a channel after its on/off switch.
    pub fn channel_volume(&self, channel: Channel) -> f32 {
        if self.enabled.get(channel) {
            self.volumes.get(channel)
        } else {
            0.0
        }
    }

    /// Step a volume by `delta_percent`, clamped to 0..=100 %.
    pub fn step_volume(&mut self, channel: Channel, delta_percent: i32) {
        let current = self.percent(channel) as i32;
        let next = (current + delta_percent).clamp(0, 100);
        self.volumes.set(channel, next as f32 / 100.0);
    }

    pub fn percent(&self, channel: Channel) -> u32 {
        (self.volumes.get(channel) * 100.0).round().clamp(0.0, 100.0) as u32
    }

    pub fn toggle(&mut self, channel: Channel) {
        let on = self.enabled.get(channel);
        self.enabled.set(channel, !on);
    }

    fn any_effect_enabled(&self) -> bool {
        EFFECT_CHANNELS.iter().any(|&c| self.enabled.get(c))
    }

    fn loudest_enabled_effect(&self) -> f32 {
        EFFECT_CHANNELS.iter().map(|&c| self.channel_volume(c)).fold(0.0, f32::max)
    }

    fn loudest_effect(&self) -> f32 {
        EFFECT_CHANNELS.iter().map(|&c| self.volumes.get(c)).fold(0.0, f32::max)
    }

    /// Final playback volume of a cue, including its boost and the current
    /// ducking factor (1.0 = no ducking).
    pub fn cue_volume(&self, cue: Cue, duck: f32) -> f32 {
        let (base, boost, ducked) = cue.profile();
        let base = match base {
            Base::Own(channel) => self.channel_volume(channel),
            Base::Effects => self.loudest_enabled_effect(),
            Base::EffectsOrAny => {
                let enabled = self.loudest_enabled_effect();
                if enabled > 0.0 {
                    enabled
                } else {
                    self.loudest_effect()
                }
            }
            Base::Any => self.loudest_effect(),
        };
        let duck = if ducked { duck } else { 1.0 };
        clamp01(base * boost * duck)
    }

    /// Whether a cue should be audible at all. `LowLives` ignores the effect
    /// switches; everything else needs at least one effect channel on.
    pub fn cue_allowed(&self, cue: Cue) -> bool {
        match cue.profile().0 {
            Base::Own(channel) => self.enabled.get(channel),
            Base::Any => true,
            Base::Effects | Base::EffectsOrAny => self.any_effect_enabled(),
        }
    }

    pub fn music_volume(&self, duck: f32) -> f32 {
        clamp01(self.channel_volume(Channel::Music) * duck)
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Owns the output device (if any), decoded clips and the voices of looping
/// or long-running cues.
pub struct AudioEngine {
    output: Option<backend::Output>,
    clips: HashMap<String, backend::Clip>,
    voices: HashMap<Cue, backend::Voice>,
    music: Option<backend::Voice>,
    settings: SoundSettings,
    duck: f32,
}

impl AudioEngine {
    /// Open the default output device, falling back to silence.
    pub fn new(settings: SoundSettings) -> Self {
        let output = match backend::Output::open() {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!(error = %e, "audio disabled, continuing without sound");
                None
            }
        };
        AudioEngine { output, clips: HashMap::new(), voices: HashMap::new(), music: None, settings, duck: 1.0 }
    }

    /// Engine that never produces sound.
    pub fn silent(settings: SoundSettings) -> Self {
        AudioEngine { output: None, clips: HashMap::new(), voices: HashMap::new(), music: None, settings, duck: 1.0 }
    }

    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }

    pub fn settings(&self) -> &SoundSettings {
        &self.settings
    }

    /// Decode and cache a clip under `key`.
    pub fn load(&mut self, key: &str, path: &Path) -> Result<()> {
        let Some(output) = &self.output else {
            tracing::trace!(%key, "silent engine, skipping decode");
            return Ok(());
        };
        let clip = output.decode(path)?;
        self.clips.insert(key.to_string(), clip);
        Ok(())
    }

    fn start(&self, cue: Cue, looped: bool) -> Option<backend::Voice> {
        let output = self.output.as_ref()?;
        let clip = self.clips.get(cue.key())?;
        if !self.settings.cue_allowed(cue) {
            return None;
        }
        let volume = self.settings.cue_volume(cue, self.duck);
        match output.play(clip, volume, looped) {
            Ok(voice) => Some(voice),
            Err(e) => {
                tracing::warn!(cue = cue.key(), error = %e, "failed to play sound");
                None
            }
        }
    }

    /// Fire and forget.
    pub fn play(&mut self, cue: Cue) {
        if let Some(voice) = self.start(cue, false) {
            voice.detach();
        }
    }

    /// Play once but keep the voice so it can be cut short with [`stop`].
    ///
    /// [`stop`]: AudioEngine::stop
    pub fn play_tracked(&mut self, cue: Cue) {
        self.stop(cue);
        if let Some(voice) = self.start(cue, false) {
            self.voices.insert(cue, voice);
        }
    }

    /// Start a looping cue unless it is already running.
    pub fn start_loop(&mut self, cue: Cue) {
        if self.voices.contains_key(&cue) {
            return;
        }
        if let Some(voice) = self.start(cue, true) {
            self.voices.insert(cue, voice);
        }
    }

    pub fn stop(&mut self, cue: Cue) {
        if let Some(voice) = self.voices.remove(&cue) {
            voice.stop();
        }
    }

    pub fn is_playing(&self, cue: Cue) -> bool {
        self.voices.contains_key(&cue)
    }

    pub fn play_music(&mut self, path: &Path) {
        let Some(output) = &self.output else { return };
        let result = output.decode(path).and_then(|clip| {
            output.play(&clip, self.settings.music_volume(self.duck), true)
        });
        match result {
            Ok(voice) => {
                if !self.settings.enabled.music {
                    voice.pause();
                }
                self.music = Some(voice);
            }
            Err(e) => tracing::warn!(error = %e, "background music unavailable"),
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(voice) = self.music.take() {
            voice.stop();
        }
    }

    /// Scale every ducked cue and the music (1.0 restores full volume).
    pub fn set_duck(&mut self, duck: f32) {
        self.duck = duck;
        self.apply_volumes();
    }

    pub fn update_settings(&mut self, update: impl FnOnce(&mut SoundSettings)) {
        update(&mut self.settings);
        self.apply_volumes();
    }

    fn apply_volumes(&mut self) {
        for (cue, voice) in &self.voices {
            voice.set_volume(self.settings.cue_volume(*cue, self.duck));
        }
        if let Some(music) = &self.music {
            music.set_volume(self.settings.music_volume(self.duck));
            if self.settings.enabled.music {
                music.resume();
            } else {
                music.pause();
            }
        }
    }
}

#[cfg(feature = "audio")]
mod backend {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use rodio::source::Buffered;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use crate::error::{GameError, Result};

    pub type Clip = Buffered<Decoder<BufReader<File>>>;

    pub struct Output {
        // The stream must outlive every sink created from its handle.
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    pub struct Voice(Sink);

    impl Output {
        pub fn open() -> Result<Output> {
            let (stream, handle) = OutputStream::try_default().map_err(|e| GameError::Audio(e.to_string()))?;
            Ok(Output { _stream: stream, handle })
        }

        pub fn decode(&self, path: &Path) -> Result<Clip> {
            let file = File::open(path)?;
            let decoder = Decoder::new(BufReader::new(file)).map_err(|e| GameError::Audio(e.to_string()))?;
            Ok(decoder.buffered())
        }

        pub fn play(&self, clip: &Clip, volume: f32, looped: bool) -> Result<Voice> {
            let sink = Sink::try_new(&self.handle).map_err(|e| GameError::Audio(e.to_string()))?;
            sink.set_volume(volume);
            if looped {
                sink.append(clip.clone().repeat_infinite());
            } else {
                sink.append(clip.clone());
            }
            Ok(Voice(sink))
        }
    }

    impl Voice {
        pub fn set_volume(&self, volume: f32) {
            self.0.set_volume(volume);
        }

        pub fn pause(&self) {
            self.0.pause();
        }

        pub fn resume(&self) {
            self.0.play();
        }

        pub fn stop(self) {
            self.0.stop();
        }

        pub fn detach(self) {
            self.0.detach();
        }
    }
}

#[cfg(not(feature = "audio"))]
#[allow(dead_code)]
mod backend {
    use std::path::Path;

    use crate::error::{GameError, Result};

    pub struct Clip;
    pub struct Output;
    pub struct Voice;

    impl Output {
        pub fn open() -> Result<Output> {
            Err(GameError::Audio("built without the `audio` feature".to_string()))
        }

        pub fn decode(&self, _path: &Path) -> Result<Clip> {
            Ok(Clip)
        }

        pub fn play(&self, _clip: &Clip, _volume: f32, _looped: bool) -> Result<Voice> {
            Ok(Voice)
        }
    }

    impl Voice {
        pub fn set_volume(&self, _volume: f32) {}
        pub fn pause(&self) {}
        pub fn resume(&self) {}
        pub fn stop(self) {}
        pub fn detach(self) {}
    }
}
