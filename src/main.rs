//! Desktop front-end: paste a video link, fetch its variants, download one.

// Metadata API client
mod api;
// Environment-driven settings
mod config;
// Form state and transitions
mod controller;
// Streams a chosen variant to disk
mod downloader;
mod error;
mod logging;
// API payloads and download bookkeeping
mod model;
mod progress;
mod sanitize;
// Preview image fetching
mod thumbnail;
#[cfg(test)]
mod test_support;

use api::MetadataClient;
use config::{ApiConfig, default_download_dir};
use controller::{FormController, Phase};
use downloader::spawn_download;
use error::FetchError;
use model::{DownloadStatus, DownloadTask, DownloadUpdate, MediaKind, QueryResult};
use sanitize::sanitize_file_name;

use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, TextureOptions, Visuals};
use once_cell::sync::OnceCell;
use rfd::FileDialog;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::{
    runtime::{Handle, Runtime},
    sync::{
        mpsc::{UnboundedReceiver, unbounded_channel},
        oneshot::{self, error::TryRecvError},
    },
};
use tracing::{error, info};

// Global Tokio runtime, created once in main
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let config = ApiConfig::from_env().map_err(|err| {
        error!(error = %err, "cannot start without API configuration");
        err
    })?;
    info!(endpoint = %config.endpoint_url, "configuration loaded");
    let client = MetadataClient::new(config)?;

    let rt = RUNTIME.get_or_try_init(|| Runtime::new().map(Arc::new))?;
    let app = GrabApp::new(client, rt.handle().clone());

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Media Grab",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(app)
        }),
    )?;
    Ok(())
}

/// Application state for the GUI
struct GrabApp {
    form: FormController,
    client: MetadataClient,
    /// Plain client for variant downloads
    http: reqwest::Client,
    runtime: Handle,
    /// Settles the in-flight metadata request
    pending: Option<oneshot::Receiver<Result<QueryResult, FetchError>>>,
    /// Destination folder for downloads
    download_folder: String,
    downloads: Vec<DownloadTask>,
    update_rxs: HashMap<u64, UnboundedReceiver<DownloadUpdate>>,
    next_download_id: u64,
    thumbnail: Option<egui::TextureHandle>,
    /// Decoded thumbnails waiting to become textures
    thumbnail_results: Arc<Mutex<Vec<(String, ColorImage)>>>,
    focus_requested: bool,
}

impl GrabApp {
    fn new(client: MetadataClient, runtime: Handle) -> Self {
        Self {
            form: FormController::new(),
            client,
            http: reqwest::Client::new(),
            runtime,
            pending: None,
            download_folder: default_download_dir().display().to_string(),
            downloads: Vec::new(),
            update_rxs: HashMap::new(),
            next_download_id: 0,
            thumbnail: None,
            thumbnail_results: Arc::new(Mutex::new(Vec::new())),
            focus_requested: false,
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let Some(video_id) = self.form.begin_submit() else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(client.fetch(&video_id).await);
            ctx.request_repaint();
        });
        self.pending = Some(rx);
    }

    fn poll_metadata(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(FetchError::Abandoned),
        };
        self.pending = None;
        let succeeded = outcome.is_ok();
        self.form.finish_submit(outcome);
        if succeeded {
            self.request_thumbnail(ctx);
        }
    }

    fn request_thumbnail(&mut self, ctx: &egui::Context) {
        self.thumbnail = None;
        let Some(url) = self.form.result().and_then(thumbnail::thumbnail_url) else {
            return;
        };
        let url = url.to_string();
        let results = Arc::clone(&self.thumbnail_results);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            if let Some(img) = thumbnail::fetch_thumbnail(&url) {
                if let Ok(mut pending) = results.lock() {
                    pending.push((url, img));
                }
                ctx.request_repaint();
            }
        });
    }

    fn start_download(&mut self) {
        let Some(request) = self.form.resolve_download() else {
            return;
        };
        let id = self.next_download_id;
        self.next_download_id += 1;

        let folder = PathBuf::from(self.download_folder.trim());
        self.downloads.push(DownloadTask {
            id,
            file_name: request.file_name.clone(),
            path: folder.join(sanitize_file_name(&request.file_name)),
            status: DownloadStatus::Downloading,
            progress: 0.0,
        });

        let (tx, rx) = unbounded_channel();
        self.update_rxs.insert(id, rx);
        self.runtime.spawn(spawn_download(self.http.clone(), request, folder, tx));
    }

    fn poll_downloads(&mut self) {
        for (id, rx) in self.update_rxs.iter_mut() {
            while let Ok(update) = rx.try_recv() {
                let Some(task) = self.downloads.iter_mut().find(|t| t.id == *id) else {
                    continue;
                };
                match update {
                    // Only move forward
                    DownloadUpdate::Progress(p) if p > task.progress => task.progress = p,
                    DownloadUpdate::Progress(_) => {}
                    DownloadUpdate::Finished(path) => {
                        task.path = path;
                        task.progress = 1.0;
                        task.status = DownloadStatus::Done;
                    }
                    DownloadUpdate::Failed(reason) => task.status = DownloadStatus::Failed(reason),
                }
            }
        }
    }

    fn downloads_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("downloads_panel").show(ctx, |ui| {
            ui.heading("Downloads");
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let mut to_remove = vec![];

                    for task in &self.downloads {
                        ui.group(|ui| {
                            ui.label(&task.file_name);
                            match &task.status {
                                DownloadStatus::Downloading => {
                                    ui.label("⬇️ Downloading");
                                }
                                DownloadStatus::Done => {
                                    ui.label("✅ Done");
                                }
                                DownloadStatus::Failed(reason) => {
                                    ui.colored_label(Color32::RED, "Failed").on_hover_text(reason);
                                }
                            }
                            ui.add(egui::ProgressBar::new(task.progress).show_percentage());

                            if task.status != DownloadStatus::Downloading {
                                ui.horizontal(|ui| {
                                    if task.status == DownloadStatus::Done
                                        && ui.button("Open Folder").clicked()
                                    {
                                        if let Some(folder) = task.path.parent() {
                                            open_folder(folder.to_path_buf());
                                        }
                                    }
                                    if ui.add(egui::Button::new("❌").fill(Color32::RED)).clicked() {
                                        to_remove.push(task.id);
                                    }
                                });
                            }
                        });
                    }

                    if !to_remove.is_empty() {
                        self.downloads.retain(|t| !to_remove.contains(&t.id));
                        for id in to_remove {
                            self.update_rxs.remove(&id);
                        }
                    }
                });
        });
    }

    fn selectors(&mut self, ui: &mut egui::Ui) {
        // Owned copy so the selectors below can borrow the form mutably
        let Some(result) = self.form.result().cloned() else {
            return;
        };
        ui.horizontal(|ui| {
            if let Some(tex) = &self.thumbnail {
                ui.add(egui::Image::new(tex).max_width(160.0));
            }
            ui.strong(&result.title);
        });

        egui::ComboBox::from_id_source("download_type")
            .selected_text(self.form.download_type.label())
            .show_ui(ui, |ui| {
                for kind in [MediaKind::Video, MediaKind::Audio] {
                    ui.selectable_value(&mut self.form.download_type, kind, kind.label());
                }
            });

        match self.form.download_type {
            MediaKind::Video => {
                let selected = if self.form.selected_video_quality.is_empty() {
                    "Select Video Quality".to_string()
                } else {
                    self.form.selected_video_quality.clone()
                };
                egui::ComboBox::from_id_source("video_quality")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for video in &result.videos.items {
                            ui.selectable_value(
                                &mut self.form.selected_video_quality,
                                video.quality.clone(),
                                format!("{} - {}", video.quality, video.size_text),
                            );
                        }
                    });
            }
            MediaKind::Audio => {
                let selected = if self.form.selected_audio_quality.is_empty() {
                    "Select Audio Quality".to_string()
                } else {
                    self.form.selected_audio_quality.clone()
                };
                egui::ComboBox::from_id_source("audio_quality")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for audio in &result.audios.items {
                            ui.selectable_value(
                                &mut self.form.selected_audio_quality,
                                audio.size_text.clone(),
                                &audio.size_text,
                            );
                        }
                    });
            }
        }
    }
}

impl App for GrabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_metadata(ctx);
        self.poll_downloads();

        if let Ok(mut pending) = self.thumbnail_results.lock() {
            for (url, img) in pending.drain(..) {
                self.thumbnail = Some(ctx.load_texture(url, img, TextureOptions::default()));
            }
        }

        self.downloads_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Enter the video link below");

            let input = ui.add(
                egui::TextEdit::singleline(&mut self.form.url_input)
                    .hint_text("Paste the video link here (YouTube)")
                    .desired_width(f32::INFINITY),
            );
            if !self.focus_requested {
                input.request_focus();
                self.focus_requested = true;
            }

            ui.horizontal(|ui| {
                ui.label("Download folder:");
                ui.text_edit_singleline(&mut self.download_folder);
                if ui.button("Browse…").clicked() {
                    if let Some(folder) = FileDialog::new().set_directory(&self.download_folder).pick_folder() {
                        self.download_folder = folder.display().to_string();
                    }
                }
            });

            if !self.form.error().is_empty() {
                ui.colored_label(Color32::RED, self.form.error());
            }

            self.selectors(ui);

            match self.form.phase() {
                Phase::Ready => {
                    if ui.button("Download").clicked() {
                        self.start_download();
                    }
                }
                Phase::Loading => {
                    ui.add_enabled(false, egui::Button::new("Loading..."));
                }
                Phase::Idle => {
                    if ui.button("Submit").clicked() {
                        self.submit(ctx);
                    }
                }
            }
        });

        // Keep progress bars moving
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn open_folder(folder: PathBuf) {
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        let opener = "explorer";
        #[cfg(target_os = "macos")]
        let opener = "open";
        #[cfg(all(unix, not(target_os = "macos")))]
        let opener = "xdg-open";

        if let Err(err) = std::process::Command::new(opener).arg(&folder).spawn() {
            tracing::warn!(folder = %folder.display(), error = %err, "could not open folder");
        }
    });
}
