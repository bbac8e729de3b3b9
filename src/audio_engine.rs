use std::sync::{Arc, RwLock};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::AudioError;

const MIN_TONE_HZ: f32 = 20.0;
const MAX_TONE_HZ: f32 = 20_000.0;
const OUTPUT_GAIN: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ToneState {
    frequency: f32,
    gate: bool,
}

impl Default for ToneState {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            gate: false,
        }
    }
}

pub struct ToneSynth {
    shared: Arc<RwLock<ToneState>>,
    _stream: cpal::Stream,
    pub device_name: String,
    pub sample_rate: u32,
}

impl ToneSynth {
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown output device".to_owned());

        let supported_config = device.default_output_config()?;
        let config = supported_config.config();
        let sample_rate = config.sample_rate.0;

        let shared = Arc::new(RwLock::new(ToneState::default()));

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, shared.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, shared.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, shared.clone())?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream.play()?;
        log::info!("audio output on {device_name} at {sample_rate} Hz");

        Ok(Self {
            shared,
            _stream: stream,
            device_name,
            sample_rate,
        })
    }

    // Calling again while sounding retunes.
    pub fn start_tone(&self, frequency_hz: f32) {
        let nyquist_limit = self.sample_rate as f32 * 0.45;
        let frequency = audible_frequency(frequency_hz, nyquist_limit);
        write_copy(
            &self.shared,
            ToneState {
                frequency,
                gate: true,
            },
        );
    }

    pub fn stop_tone(&self) {
        let mut state = read_copy(&self.shared);
        state.gate = false;
        write_copy(&self.shared, state);
    }
}

fn audible_frequency(frequency_hz: f32, nyquist_limit: f32) -> f32 {
    if !frequency_hz.is_finite() {
        return MIN_TONE_HZ;
    }
    frequency_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ.min(nyquist_limit).max(MIN_TONE_HZ))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: Arc<RwLock<ToneState>>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut voice = ToneVoice::new(config.sample_rate.0 as f32);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let state = read_copy(&shared);
            write_audio_buffer(data, channels, &mut voice, state);
        },
        move |err| {
            log::error!("audio stream error: {err}");
        },
        None,
    )?;

    Ok(stream)
}

fn write_audio_buffer<T>(output: &mut [T], channels: usize, voice: &mut ToneVoice, state: ToneState)
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let sample = T::from_sample(voice.next_sample(state) * OUTPUT_GAIN);
        for slot in frame.iter_mut() {
            *slot = sample;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

struct ToneVoice {
    sample_rate: f32,
    phase: f32,
    level: f32,
    stage: Stage,
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

impl ToneVoice {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            level: 0.0,
            stage: Stage::Idle,
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }

    fn next_sample(&mut self, state: ToneState) -> f32 {
        self.update_envelope(state.gate);
        if self.stage == Stage::Idle {
            return 0.0;
        }

        self.phase = (self.phase + state.frequency / self.sample_rate).fract();
        triangle(self.phase) * self.level
    }

    fn update_envelope(&mut self, gate: bool) {
        let dt = 1.0 / self.sample_rate;
        match (gate, self.stage) {
            (true, Stage::Idle | Stage::Release) => self.stage = Stage::Attack,
            (false, Stage::Attack | Stage::Decay | Stage::Sustain) => self.stage = Stage::Release,
            _ => {}
        }

        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => {
                self.level += dt / self.attack;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level -= dt / self.decay * (1.0 - self.sustain);
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.level = self.sustain,
            Stage::Release => {
                self.level -= dt / self.release * self.sustain;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                    self.phase = 0.0;
                }
            }
        }
    }
}

fn triangle(phase: f32) -> f32 {
    1.0 - 4.0 * (phase - 0.5).abs()
}

fn read_copy<T: Copy>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_copy<T: Copy>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 48_000.0;

    fn run(voice: &mut ToneVoice, state: ToneState, seconds: f32) -> Vec<f32> {
        (0..(seconds * RATE) as usize)
            .map(|_| voice.next_sample(state))
            .collect()
    }

    #[test]
    fn silent_until_gate_opens() {
        let mut voice = ToneVoice::new(RATE);
        let closed = ToneState::default();
        assert!(run(&mut voice, closed, 0.05).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn envelope_reaches_sustain_then_releases_to_silence() {
        let mut voice = ToneVoice::new(RATE);
        let open = ToneState {
            frequency: 440.0,
            gate: true,
        };
        let held = run(&mut voice, open, 0.3);
        assert_eq!(voice.stage, Stage::Sustain);
        let peak = held.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.9 && peak <= 1.0);

        let released = run(&mut voice, ToneState { gate: false, ..open }, 1.2);
        assert_eq!(voice.stage, Stage::Idle);
        assert_eq!(*released.last().expect("samples"), 0.0);
    }

    #[test]
    fn triangle_shape() {
        assert_eq!(triangle(0.0), -1.0);
        assert_eq!(triangle(0.5), 1.0);
        assert_eq!(triangle(0.25), 0.0);
    }

    #[test]
    fn tone_frequency_is_kept_audible() {
        assert_eq!(audible_frequency(1_000_000.0, 21_600.0), 20_000.0);
        assert_eq!(audible_frequency(1_000_000.0, 19_845.0), 19_845.0);
        assert_eq!(audible_frequency(2.0, 21_600.0), 20.0);
        assert_eq!(audible_frequency(f32::NAN, 21_600.0), 20.0);
    }

    #[test]
    fn shared_state_is_copied_whole() {
        let lock = RwLock::new(ToneState::default());
        write_copy(
            &lock,
            ToneState {
                frequency: 880.0,
                gate: true,
            },
        );
        assert_eq!(read_copy(&lock).frequency, 880.0);
    }
}
