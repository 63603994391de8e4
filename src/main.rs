use clap::Parser;
use iced::widget::scrollable::RelativeOffset;
use iced::widget::{button, column, container, horizontal_space, row, scrollable, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod cli;
mod config;
mod error;
mod gallery;
mod logging;
mod state;
mod ui;

use cli::Cli;
use config::{ConfigLayer, GalleryConfig};
use gallery::FsProbe;
use logging::LogConfig;
use state::pagination::Navigation;
use state::session::{GallerySession, PageOutcome};

/// Scrollable holding the cards, reset to the top on navigation
const GALLERY_SCROLL_ID: &str = "gallery";

/// Main application state
struct SlotGallery {
    /// Defaults plus user and explicit config files
    base: GalleryConfig,
    /// Command line overrides, applied over every folder manifest
    flags: ConfigLayer,
    /// The open gallery. `None` until a folder is opened.
    session: Option<GallerySession<FsProbe>>,
    /// Bumped for every opened folder so late results from a previous
    /// folder are ignored
    session_id: u64,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Open Folder" button
    OpenFolder,
    GoToPage(u32),
    PreviousPage,
    NextPage,
    /// Background page load completed
    PageLoaded {
        session: u64,
        generation: u64,
        outcome: PageOutcome,
    },
    /// A card was activated
    OpenImage { slot: u32, url: String },
}

impl SlotGallery {
    /// Create a new instance of the application
    fn new(cli: Cli) -> (Self, Task<Message>) {
        let (base, status) = match config::load_base(cli.config.as_deref()) {
            Ok(base) => (base, "Open a folder of numbered images.".to_string()),
            Err(err) => {
                tracing::error!(error = %err, "failed to load config, using defaults");
                (GalleryConfig::default(), format!("⚠️  {}", err))
            }
        };

        let mut app = SlotGallery {
            base,
            flags: cli.overrides(),
            session: None,
            session_id: 0,
            status,
        };

        let task = match cli.folder {
            Some(folder) => app.open(folder),
            None => Task::none(),
        };

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Gallery Folder")
                    .pick_folder();

                match folder {
                    Some(folder) => self.open(folder),
                    None => Task::none(),
                }
            }
            Message::GoToPage(page) => self.navigate(|session| session.go_to_page(i64::from(page))),
            Message::PreviousPage => self.navigate(GallerySession::previous),
            Message::NextPage => self.navigate(GallerySession::next),
            Message::PageLoaded {
                session,
                generation,
                outcome,
            } => {
                if session != self.session_id {
                    tracing::debug!(session, current = self.session_id, "ignoring load from closed folder");
                    return Task::none();
                }
                let Some(gallery) = self.session.as_mut() else {
                    return Task::none();
                };
                if gallery.complete(generation, &outcome) {
                    let pagination = gallery.pagination();
                    self.status = match &outcome {
                        Ok(_) => format!(
                            "Page {} of {} · {} slots checked",
                            pagination.current_page(),
                            pagination.total_pages(),
                            gallery.cached_slots()
                        ),
                        Err(err) => format!("⚠️  {}", err),
                    };
                }
                Task::none()
            }
            Message::OpenImage { slot, url } => {
                // The system image viewer stands in for a lightbox
                match open::that_detached(&url) {
                    Ok(()) => tracing::info!(slot, url = %url, "opened image"),
                    Err(err) => {
                        tracing::warn!(slot, url = %url, error = %err, "failed to open image");
                        self.status = format!("⚠️  Could not open {}: {}", url, err);
                    }
                }
                Task::none()
            }
        }
    }

    /// Start a session for `folder` and load its first page
    fn open(&mut self, folder: PathBuf) -> Task<Message> {
        let config = match GalleryConfig::for_folder(&self.base, &folder, &self.flags) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(folder = %folder.display(), error = %err, "cannot open gallery");
                self.status = format!("⚠️  {}: {}", folder.display(), err);
                return Task::none();
            }
        };

        let mut gallery = GallerySession::new(&config, FsProbe);
        let nav = gallery.begin();
        self.session_id += 1;
        self.status = format!(
            "Loading {} ({} slots, {} pages)...",
            folder.display(),
            config.total,
            gallery.pagination().total_pages()
        );

        let task = load(&gallery, self.session_id, nav);
        self.session = Some(gallery);
        task
    }

    /// Apply a navigation step and, if accepted, load the new page
    fn navigate<F>(&mut self, step: F) -> Task<Message>
    where
        F: FnOnce(&mut GallerySession<FsProbe>) -> Option<Navigation>,
    {
        let Some(gallery) = self.session.as_mut() else {
            return Task::none();
        };
        let Some(nav) = step(gallery) else {
            return Task::none();
        };

        Task::batch([
            load(gallery, self.session_id, nav),
            scrollable::snap_to(scrollable::Id::new(GALLERY_SCROLL_ID), RelativeOffset::START),
        ])
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let header = column![
            text("Slot Gallery").size(32),
            text(&self.status).size(14),
        ]
        .spacing(6);

        let open_button = button("Open Folder")
            .on_press(Message::OpenFolder)
            .padding(10);

        let Some(gallery) = &self.session else {
            let content = column![header, open_button]
                .spacing(20)
                .padding(40)
                .align_x(Alignment::Center);

            return container(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let cards = scrollable(
            container(ui::grid::gallery(gallery.view(), gallery.columns()))
                .width(Length::Fill)
                .padding(4),
        )
        .id(scrollable::Id::new(GALLERY_SCROLL_ID))
        .height(Length::Fill);

        column![
            row![header, horizontal_space(), open_button].align_y(Alignment::Center),
            cards,
            ui::grid::pagination_bar(gallery.pagination().controls()),
        ]
        .spacing(16)
        .padding(24)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Run the load for `nav` in the background
fn load(gallery: &GallerySession<FsProbe>, session: u64, nav: Navigation) -> Task<Message> {
    Task::perform(gallery.fetch(nav), move |(generation, outcome)| {
        Message::PageLoaded {
            session,
            generation,
            outcome,
        }
    })
}

fn main() -> iced::Result {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_log_file(cli.log_file.clone());
    if let Err(err) = logging::init_logging(&log_config) {
        tracing::warn!(error = %err, "failed to open log file, logging to stderr");
    }

    tracing::info!("Starting Slot Gallery");

    iced::application(
        "Slot Gallery",
        SlotGallery::update,
        SlotGallery::view,
    )
    .theme(SlotGallery::theme)
    .centered()
    .run_with(move || SlotGallery::new(cli))
}
