use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use gtk4::prelude::*;
use gtk4::{
    gio, glib, Align, Application, ApplicationWindow, Box as GtkBox, Button, FileChooserAction,
    FileChooserNative, GestureDrag, Label, Orientation, ResponseType, ScrolledWindow, Stack,
    TextView, WrapMode,
};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::input::ViewState;
use crate::notification::{Notice, Notifier};
use crate::storage::PathTarget;

use super::{ActionOutcome, Launchpad, LaunchpadAction, PermissionPoll};

const APP_ID: &str = "io.github.slam_launcher";
const PERMISSION_POLL_INTERVAL: Duration = Duration::from_millis(24);
const LOG_END_MARK: &str = "log-end";
const ORIGIN_PAGE: &str = "origin";
const LOADING_PAGE: &str = "loading";

type SharedLaunchpad = Rc<RefCell<Launchpad>>;
type ChooserSlot = Rc<RefCell<Option<FileChooserNative>>>;

/// In-window toast; a newer notice cancels the hide timer of an older one.
#[derive(Clone)]
struct ToastNotifier {
    label: Label,
    sequence: Rc<Cell<u64>>,
}

impl ToastNotifier {
    fn new(label: &Label) -> Self {
        Self {
            label: label.clone(),
            sequence: Rc::new(Cell::new(0)),
        }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        self.label.set_text(&notice.message);
        self.label.set_visible(true);

        let sequence = self.sequence.get().saturating_add(1);
        self.sequence.set(sequence);

        let label = self.label.clone();
        let latest_sequence = self.sequence.clone();
        glib::timeout_add_local_once(
            Duration::from_millis(u64::from(notice.duration.millis())),
            move || {
                if latest_sequence.get() == sequence {
                    label.set_visible(false);
                }
            },
        );
    }
}

#[derive(Clone)]
struct PathLabels {
    calibration: Label,
    vocabulary: Label,
}

impl PathLabels {
    fn refresh(&self, launchpad: &Launchpad) {
        let config = launchpad.configuration();
        self.calibration
            .set_text(&format!("calibration path is {}", config.calibration_path));
        self.vocabulary
            .set_text(&format!("VOC path is {}", config.vocabulary_path));
    }
}

pub fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("starting gtk runtime");
    let application = Application::new(Some(APP_ID), gio::ApplicationFlags::NON_UNIQUE);
    let launchpad_slot: Rc<RefCell<Option<SharedLaunchpad>>> = Rc::new(RefCell::new(None));

    let slot_for_activate = launchpad_slot.clone();
    application.connect_activate(move |app| {
        if slot_for_activate.borrow().is_some() {
            return;
        }
        let launchpad = build_window(app, &config);
        *slot_for_activate.borrow_mut() = Some(launchpad);
    });

    let no_args: [&str; 0] = [];
    application.run_with_args(&no_args);

    if let Some(launchpad) = launchpad_slot.borrow_mut().take() {
        launchpad.borrow_mut().shutdown();
    }
    Ok(())
}

fn build_window(app: &Application, config: &AppConfig) -> SharedLaunchpad {
    let toast_label = Label::new(None);
    toast_label.add_css_class("osd");
    toast_label.set_halign(Align::Center);
    toast_label.set_visible(false);

    let launchpad = Rc::new(RefCell::new(Launchpad::from_config(
        config,
        Rc::new(ToastNotifier::new(&toast_label)),
    )));

    let log_view = TextView::new();
    log_view.set_editable(false);
    log_view.set_cursor_visible(false);
    log_view.set_monospace(true);
    log_view.set_wrap_mode(WrapMode::WordChar);
    for entry in launchpad.borrow().logger().entries() {
        append_log_line(&log_view, &entry.line());
    }
    let log_view_for_listener = log_view.clone();
    launchpad
        .borrow()
        .logger()
        .set_display_listener(move |entry| append_log_line(&log_view_for_listener, &entry.line()));

    let log_scroller = ScrolledWindow::new();
    log_scroller.set_vexpand(true);
    log_scroller.set_child(Some(&log_view));

    let path_labels = PathLabels {
        calibration: Label::new(None),
        vocabulary: Label::new(None),
    };
    for label in [&path_labels.calibration, &path_labels.vocabulary] {
        label.set_halign(Align::Start);
        label.set_wrap(true);
    }
    path_labels.refresh(&launchpad.borrow());

    let start_button = Button::with_label("Start SLAM");
    let choose_calibration = Button::with_label("Choose calibration");
    let choose_vocabulary = Button::with_label("Choose VOC");

    let origin_panel = GtkBox::new(Orientation::Vertical, 8);
    origin_panel.append(&start_button);
    origin_panel.append(&choose_calibration);
    origin_panel.append(&path_labels.calibration);
    origin_panel.append(&choose_vocabulary);
    origin_panel.append(&path_labels.vocabulary);

    let loading_panel = GtkBox::new(Orientation::Vertical, 8);
    loading_panel.append(&Label::new(Some("Swipe right to return to the launcher")));

    let panels = Stack::new();
    panels.add_named(&origin_panel, Some(ORIGIN_PAGE));
    panels.add_named(&loading_panel, Some(LOADING_PAGE));
    show_view(&panels, launchpad.borrow().view());

    let root = GtkBox::new(Orientation::Vertical, 12);
    root.set_margin_top(12);
    root.set_margin_bottom(12);
    root.set_margin_start(12);
    root.set_margin_end(12);
    root.append(&panels);
    root.append(&log_scroller);
    root.append(&toast_label);

    let window = ApplicationWindow::builder()
        .application(app)
        .title("SLAM Launcher")
        .default_width(480)
        .default_height(720)
        .child(&root)
        .build();

    let launchpad_for_start = launchpad.clone();
    start_button.connect_clicked(move |_| {
        let outcome = launchpad_for_start
            .borrow_mut()
            .dispatch(LaunchpadAction::StartSession);
        if outcome == ActionOutcome::PermissionPending {
            watch_permission(launchpad_for_start.clone());
        }
    });

    let chooser_slot: ChooserSlot = Rc::new(RefCell::new(None));
    for (button, target) in [
        (&choose_calibration, PathTarget::Calibration),
        (&choose_vocabulary, PathTarget::Vocabulary),
    ] {
        let window = window.clone();
        let launchpad = launchpad.clone();
        let path_labels = path_labels.clone();
        let chooser_slot = chooser_slot.clone();
        button.connect_clicked(move |_| {
            choose_path(&window, &launchpad, &path_labels, &chooser_slot, target);
        });
    }

    connect_fling_gesture(&root, &panels, &launchpad);

    window.present();
    launchpad
}

fn append_log_line(view: &TextView, line: &str) {
    let buffer = view.buffer();
    let mut end = buffer.end_iter();
    buffer.insert(&mut end, &format!("{line}\n"));

    let end = buffer.end_iter();
    let mark = match buffer.mark(LOG_END_MARK) {
        Some(mark) => {
            buffer.move_mark(&mark, &end);
            mark
        }
        None => buffer.create_mark(Some(LOG_END_MARK), &end, false),
    };
    view.scroll_to_mark(&mark, 0.0, false, 0.0, 1.0);
}

fn show_view(panels: &Stack, view: ViewState) {
    let page = match view {
        ViewState::Loading => LOADING_PAGE,
        ViewState::Origin => ORIGIN_PAGE,
    };
    panels.set_visible_child_name(page);
}

fn watch_permission(launchpad: SharedLaunchpad) {
    glib::timeout_add_local(PERMISSION_POLL_INTERVAL, move || {
        match launchpad.borrow_mut().poll_permission(Duration::ZERO) {
            PermissionPoll::Pending => glib::ControlFlow::Continue,
            PermissionPoll::Idle | PermissionPoll::Resolved { .. } => glib::ControlFlow::Break,
        }
    });
}

#[allow(deprecated)]
fn choose_path(
    window: &ApplicationWindow,
    launchpad: &SharedLaunchpad,
    path_labels: &PathLabels,
    chooser_slot: &ChooserSlot,
    target: PathTarget,
) {
    let outcome = launchpad
        .borrow_mut()
        .dispatch(LaunchpadAction::for_target(target));
    let ActionOutcome::PickPath { target, start_dir } = outcome else {
        return;
    };

    let title = match target {
        PathTarget::Calibration => "Choose calibration file",
        PathTarget::Vocabulary => "Choose vocabulary file",
    };
    let chooser = FileChooserNative::new(
        Some(title),
        Some(window),
        FileChooserAction::Open,
        Some("Select"),
        Some("Cancel"),
    );
    if let Err(err) = chooser.set_current_folder(Some(&gio::File::for_path(&start_dir))) {
        tracing::warn!(
            ?err,
            start_dir = %start_dir.display(),
            "failed to open chooser at storage root"
        );
    }

    let launchpad = launchpad.clone();
    let path_labels = path_labels.clone();
    let slot_for_response = chooser_slot.clone();
    chooser.connect_response(move |chooser, response| {
        let chosen = if response == ResponseType::Accept {
            chooser.file().and_then(|file| file.path())
        } else {
            None
        };
        {
            let mut launchpad = launchpad.borrow_mut();
            launchpad.on_file_chosen(target, chosen);
            path_labels.refresh(&launchpad);
        }
        slot_for_response.borrow_mut().take();
    });

    chooser.show();
    *chooser_slot.borrow_mut() = Some(chooser);
}

fn connect_fling_gesture(root: &GtkBox, panels: &Stack, launchpad: &SharedLaunchpad) {
    let drag = GestureDrag::new();
    let drag_started_at = Rc::new(Cell::new(None::<Instant>));

    let started_for_begin = drag_started_at.clone();
    drag.connect_drag_begin(move |_, _, _| {
        started_for_begin.set(Some(Instant::now()));
    });

    let panels = panels.clone();
    let launchpad = launchpad.clone();
    drag.connect_drag_end(move |gesture, offset_x, _| {
        let (Some((start_x, _)), Some(started_at)) =
            (gesture.start_point(), drag_started_at.take())
        else {
            return;
        };
        let elapsed = started_at.elapsed().as_secs_f64().max(f64::EPSILON);
        let velocity_x = offset_x / elapsed;
        if let Some(view) = launchpad
            .borrow_mut()
            .on_fling(start_x, start_x + offset_x, velocity_x)
        {
            show_view(&panels, view);
        }
    });

    root.add_controller(drag);
}
