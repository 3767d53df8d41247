//! Recognition Worker (C2) — drives a streaming ASR source on a dedicated
//! OS thread and fans out partial/final/error callbacks without ever
//! blocking on them.
//!
//! Native ASR resources are commonly `!Send` or simply expect to own a
//! blocking loop for their lifetime, so rather than forcing them into the
//! async runtime we confine the recognizer to one thread and proxy every
//! operation through a command channel, the same shape this codebase uses
//! for its own thread-confined native audio resources (`AudioThreadHandle`).
//! The `Send + Sync` handle is what the rest of the engine holds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::collaborators::{RecognitionCallbacks, SpeechRecognizer};
use crate::error::EngineError;

enum RecognizerCommand {
    PrepareSink {
        reply: oneshot::Sender<Result<(), String>>,
    },
    Start {
        callbacks: Arc<dyn RecognitionCallbacks>,
        reply: oneshot::Sender<Result<(), String>>,
    },
    WriteBytes {
        pcm: Vec<u8>,
        /// Set by the caller on timeout. The worker checks this right
        /// before handing `pcm` to the recognizer so a chunk the caller has
        /// already given up on never reaches the native write.
        abandoned: Arc<AtomicBool>,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Stop,
    Shutdown,
}

/// `Send + Sync` handle to the dedicated recognition thread.
pub struct RecognitionWorkerHandle {
    cmd_tx: std_mpsc::Sender<RecognizerCommand>,
    thread: parking_lot::Mutex<Option<thread::JoinHandle<()>>>,
}

impl RecognitionWorkerHandle {
    /// Spawn the worker thread. `build` constructs the (likely `!Send`)
    /// recognizer on the worker thread itself, so it never crosses a
    /// thread boundary.
    pub fn spawn<F>(build: F) -> Result<Self, EngineError>
    where
        F: FnOnce() -> Box<dyn SpeechRecognizer> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = std_mpsc::channel::<RecognizerCommand>();

        let thread = thread::Builder::new()
            .name("callgate-recognizer".into())
            .spawn(move || {
                let recognizer = build();
                Self::run(recognizer, cmd_rx);
            })
            .map_err(|e| EngineError::RecognitionThreadSpawn(e.to_string()))?;

        Ok(Self {
            cmd_tx,
            thread: parking_lot::Mutex::new(Some(thread)),
        })
    }

    /// Create the audio input sink if absent. Safe to call before
    /// `start`.
    pub async fn prepare_sink(&self) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.send(RecognizerCommand::PrepareSink { reply: tx })?;
        self.await_reply(rx).await
    }

    /// Begin recognition with the given callbacks. Idempotent at the
    /// recognizer level.
    pub async fn start(&self, callbacks: Arc<dyn RecognitionCallbacks>) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.send(RecognizerCommand::Start {
            callbacks,
            reply: tx,
        })?;
        self.await_reply(rx).await
    }

    /// Hand raw PCM bytes to the sink, bounded by `timeout`. On timeout the
    /// chunk is marked abandoned: if the worker thread hasn't reached it
    /// yet, it skips the native write entirely rather than delivering
    /// stale audio to the recognizer after the caller has moved on; if the
    /// write is already in flight, the abandon flag has no effect on it and
    /// only this call's await is what times out. Either way this does not
    /// propagate as a fatal error.
    pub async fn write_bytes(&self, pcm: Vec<u8>, timeout: Duration) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        let abandoned = Arc::new(AtomicBool::new(false));
        self.send(RecognizerCommand::WriteBytes {
            pcm,
            abandoned: abandoned.clone(),
            reply: tx,
        })?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(message))) => Err(EngineError::Orchestrator(anyhow::anyhow!(message))),
            Ok(Err(_)) => Err(EngineError::RecognitionThreadDied),
            Err(_) => {
                abandoned.store(true, Ordering::Release);
                tracing::warn!("audio chunk write timed out; abandoning chunk");
                Ok(())
            }
        }
    }

    /// Halt recognition. Fire-and-forget — the worker stops at its own
    /// pace; callers that need a bound should follow with `join`.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(RecognizerCommand::Stop);
    }

    /// Join the worker thread, bounded by `timeout`. Used during session
    /// shutdown. Takes `&self` (rather than consuming) because the
    /// handle is normally held behind an `Arc`; safe to call at most once
    /// — a second call is a no-op since the thread slot is already empty.
    pub fn join(&self, timeout: Duration) {
        let _ = self.cmd_tx.send(RecognizerCommand::Shutdown);
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            let (done_tx, done_rx) = std_mpsc::channel::<()>();
            let joiner = thread::spawn(move || {
                let _ = handle.join();
                let _ = done_tx.send(());
            });
            if done_rx.recv_timeout(timeout).is_err() {
                tracing::warn!("recognition worker thread did not join within the shutdown budget");
            }
            let _ = joiner.join();
        }
    }

    fn send(&self, cmd: RecognizerCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| EngineError::RecognitionThreadDied)
    }

    async fn await_reply(&self, rx: oneshot::Receiver<Result<(), String>>) -> Result<(), EngineError> {
        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(message)) => Err(EngineError::RecognizerInit(message)),
            Err(_) => Err(EngineError::RecognitionThreadDied),
        }
    }

    /// The dedicated thread's command loop. Owns the recognizer for its
    /// entire lifetime — it never crosses the thread boundary.
    fn run(mut recognizer: Box<dyn SpeechRecognizer>, cmd_rx: std_mpsc::Receiver<RecognizerCommand>) {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                RecognizerCommand::PrepareSink { reply } => {
                    let result = recognizer.prepare_sink().map_err(|e| e.to_string());
                    let _ = reply.send(result);
                }
                RecognizerCommand::Start { callbacks, reply } => {
                    let result = recognizer.start(callbacks).map_err(|e| e.to_string());
                    let _ = reply.send(result);
                }
                RecognizerCommand::WriteBytes {
                    pcm,
                    abandoned,
                    reply,
                } => {
                    if abandoned.load(Ordering::Acquire) {
                        tracing::debug!("skipping write for abandoned audio chunk");
                    } else {
                        let result = recognizer.write_bytes(&pcm).map_err(|e| e.to_string());
                        let _ = reply.send(result);
                    }
                }
                RecognizerCommand::Stop => recognizer.stop(),
                RecognizerCommand::Shutdown => {
                    recognizer.stop();
                    break;
                }
            }
        }
        tracing::debug!("recognition worker thread shutting down");
    }
}

impl Drop for RecognitionWorkerHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RecognizerCommand::Shutdown);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}
