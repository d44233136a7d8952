use rodio::{OutputStream, Sink, Source};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

use super::{Atmosphere, SAMPLE_RATE};

enum AudioCommand {
    Play(Atmosphere),
    Stop,
    SetVolume(f32),
}

/// Endless mono source over one of the atmosphere generators.
struct AtmosphereSource {
    samples: Box<dyn Iterator<Item = f32> + Send>,
}

impl Iterator for AtmosphereSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.samples.next()
    }
}

impl Source for AtmosphereSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Handle to the audio thread. rodio's output stream is not `Send`, so it
/// lives on a dedicated thread driven over a channel.
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    playing: Arc<Mutex<Option<Atmosphere>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            playing: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut volume = 0.5f32;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play(atmosphere) => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            match OutputStream::try_default() {
                                Ok((stream, handle)) => match Sink::try_new(&handle) {
                                    Ok(new_sink) => {
                                        new_sink.set_volume(volume);
                                        new_sink.append(AtmosphereSource {
                                            samples: atmosphere.generator(),
                                        });
                                        new_sink.play();
                                        _stream = Some(stream);
                                        sink = Some(new_sink);
                                    }
                                    Err(e) => log::error!("Failed to create audio sink: {}", e),
                                },
                                Err(e) => log::error!("Failed to create audio output stream: {}", e),
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                        }
                        AudioCommand::SetVolume(v) => {
                            volume = v.clamp(0.0, 1.0);
                            if let Some(ref s) = sink {
                                s.set_volume(volume);
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    pub fn play(&self, atmosphere: Atmosphere, volume: f32) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::SetVolume(volume))
            .map_err(|e| e.to_string())?;
        tx.send(AudioCommand::Play(atmosphere))
            .map_err(|e| e.to_string())?;
        *self.playing.lock().map_err(|e| e.to_string())? = Some(atmosphere);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        *self.playing.lock().map_err(|e| e.to_string())? = None;
        Ok(())
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::SetVolume(volume))
            .map_err(|e| e.to_string())
    }

    pub fn now_playing(&self) -> Option<Atmosphere> {
        self.playing.lock().ok().and_then(|g| *g)
    }
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}
