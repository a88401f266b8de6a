//! Window that plays the report frames one after another.

use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Element, Length, Subscription, Task};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::report::Frame;

#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    KeyPressed,
}

#[derive(Clone)]
struct ViewerFrame {
    title: String,
    handle: Handle,
    hold: Duration,
}

/// Report text waiting to be printed, shared with the caller of the viewer
type PendingReport = Arc<Mutex<Option<String>>>;

struct FrameViewer {
    frames: Vec<ViewerFrame>,
    index: usize,
    shown_at: Instant,
    report: PendingReport,
}

fn take_report(report: &PendingReport) -> Option<String> {
    report.lock().ok().and_then(|mut pending| pending.take())
}

impl FrameViewer {
    fn new(frames: Vec<ViewerFrame>, report: PendingReport) -> Self {
        Self {
            frames,
            index: 0,
            shown_at: Instant::now(),
            report,
        }
    }

    /// The report once the last frame has been up for its hold
    fn due_report(&self, now: Instant) -> Option<String> {
        let frame = self.frames.get(self.index)?;
        if self.is_last() && now.duration_since(self.shown_at) >= frame.hold {
            take_report(&self.report)
        } else {
            None
        }
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.frames.len()
    }

    fn advance(&mut self) {
        self.index += 1;
        self.shown_at = Instant::now();
    }

    fn title(&self) -> String {
        self.frames
            .get(self.index)
            .map(|f| f.title.clone())
            .unwrap_or_else(|| "ImageOutput".to_string())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // The last frame stays up until dismissed
            Message::Tick(now) => {
                if let Some(frame) = self.frames.get(self.index) {
                    if !self.is_last() && now.duration_since(self.shown_at) >= frame.hold {
                        self.advance();
                    }
                }
                if let Some(report) = self.due_report(now) {
                    println!("{report}");
                }
                Task::none()
            }
            Message::KeyPressed => {
                if self.is_last() {
                    if let Some(report) = take_report(&self.report) {
                        println!("{report}");
                    }
                    iced::exit()
                } else {
                    self.advance();
                    Task::none()
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let Some(frame) = self.frames.get(self.index) else {
            return text("No frames").into();
        };

        let content = column![
            text(frame.title.clone()).size(20),
            iced::widget::image(frame.handle.clone())
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .spacing(10)
        .padding(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(Duration::from_millis(100)).map(Message::Tick),
            iced::event::listen_with(|event, _status, _window| match event {
                iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { .. }) => {
                    Some(Message::KeyPressed)
                }
                _ => None,
            }),
        ])
    }
}

fn viewer_frames(frames: &[Frame]) -> Vec<ViewerFrame> {
    frames
        .iter()
        .map(|f| {
            let rgba = f.image.to_rgba8();
            let (w, h) = rgba.dimensions();
            ViewerFrame {
                title: f.title.clone(),
                handle: Handle::from_rgba(w, h, rgba.into_raw()),
                hold: f.hold,
            }
        })
        .collect()
}

/// Show the frames in a window, blocking until the user dismisses the last one.
/// `report` is printed to stdout once the last frame has been shown for its hold,
/// or when the window closes, whichever comes first.
pub fn show_frames(frames: &[Frame], report: String) -> anyhow::Result<()> {
    let frames = viewer_frames(frames);
    let pending: PendingReport = Arc::new(Mutex::new(Some(report)));
    let shared = pending.clone();

    let result = iced::application(
        move || FrameViewer::new(frames.clone(), shared.clone()),
        FrameViewer::update,
        FrameViewer::view,
    )
    .title(FrameViewer::title)
    .subscription(FrameViewer::subscription)
    .run()
    .map_err(|e| anyhow::anyhow!("Failed to run frame viewer: {}", e));

    if let Some(report) = take_report(&pending) {
        println!("{report}");
    }
    result
}
