//! Main app runner for the record flow

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::application::ports::{
    CaptureDevice, ConfigStore, Notifier, PermissionGate, SourcePicker, SourcePlayer,
};
use crate::application::{RecordingSession, SessionConfig, SessionError};
use crate::domain::config::AppConfig;
use crate::infrastructure::{
    ArgSourcePicker, CpalWavCapture, HostPermissionGate, NotifyRustNotifier, PromptSourcePicker,
    RodioPlayer, XdgConfigStore,
};

use super::args::RecordOptions;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run one record/playback session
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let picker: Box<dyn SourcePicker> = match options.source {
        Some(path) => Box::new(ArgSourcePicker::new(Some(path))),
        None => Box::new(PromptSourcePicker::new()),
    };

    let session_config = SessionConfig {
        output_dir: options.output_dir.clone(),
        require_storage_permission: options.require_storage_permission,
        enable_notify: options.notify,
    };

    let controller = RecordingSession::new(
        RodioPlayer::new(),
        CpalWavCapture::new(options.sample_rate),
        picker,
        HostPermissionGate::new(options.output_dir),
        NotifyRustNotifier::new(),
        session_config,
    );

    match drive(&controller, &mut presenter, options.save_as).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            present_error(&presenter, &e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// The interactive session flow: pick, record until Enter, stop, save
async fn drive<P, C, F, G, N>(
    controller: &RecordingSession<P, C, F, G, N>,
    presenter: &mut Presenter,
    preset_name: Option<String>,
) -> Result<(), SessionError>
where
    P: SourcePlayer,
    C: CaptureDevice,
    F: SourcePicker,
    G: PermissionGate,
    N: Notifier,
{
    let Some(source) = controller.select_source().await? else {
        presenter.info("No file selected");
        return Ok(());
    };
    presenter.info(&format!("Playing along with {}", source.display()));

    controller.start().await?;
    presenter.start_spinner("Recording... press Enter to stop");
    wait_for_enter().await;
    presenter.stop_spinner();

    let Some(finished) = controller.stop().await? else {
        return Ok(());
    };
    presenter.info(&format!(
        "Captured {:.1}s to {}",
        controller.elapsed_ms() as f64 / 1000.0,
        finished.display()
    ));

    // A name given up front makes the save non-interactive
    if let Some(name) = preset_name {
        let saved = controller.save_as(&name).await?;
        presenter.success(&format!("Saved to {}", saved.display()));
        presenter.output(&saved.to_string_lossy());
        return Ok(());
    }

    loop {
        let name = prompt_line("Save as (blank keeps the temp file): ")
            .await
            .map_err(|reason| SessionError::SaveFailed { reason })?;
        if name.is_empty() {
            if let Some(kept) = controller.discard().await? {
                presenter.warn(&format!("Not saved; temp file kept at {}", kept.display()));
            }
            return Ok(());
        }
        match controller.save_as(&name).await {
            Ok(saved) => {
                presenter.success(&format!("Saved to {}", saved.display()));
                presenter.output(&saved.to_string_lossy());
                return Ok(());
            }
            Err(e @ SessionError::InvalidName(_)) | Err(e @ SessionError::SaveFailed { .. }) => {
                // Session stays stopped with the temp file intact; ask again
                presenter.error(&e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Translate a session error into a user-facing message
fn present_error(presenter: &Presenter, error: &SessionError) {
    match error {
        SessionError::PermissionDenied { capability } => {
            presenter.error(&format!("{error}. {}", capability.rationale()));
        }
        _ => presenter.error(&error.to_string()),
    }
}

/// Block on one Enter keypress without holding up the runtime
async fn wait_for_enter() {
    let _ = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    })
    .await;
}

/// Prompt on stderr and read one trimmed line from stdin
async fn prompt_line(prompt: &str) -> Result<String, String> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        eprint!("{prompt}");
        io::stderr().flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    })
    .await
    .map_err(|e| e.to_string())?
}

/// Load and merge configuration: defaults < file < CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Where recordings go when neither the CLI nor the config names a directory
pub fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("overdub")
}
