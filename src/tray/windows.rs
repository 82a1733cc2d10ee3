//! Windows system tray implementation.

use anyhow::{Context, Result};
use std::thread::JoinHandle;
use tracing::{debug, error, info};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem},
    Icon, TrayIcon, TrayIconBuilder, TrayIconEvent,
};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::WindowId;

use crate::config::Config;
use crate::i18n::MenuTexts;
use crate::render::{face, ClockRenderer};
use crate::scheduler::{Frame, FrameSink, Scheduler, SinkClosed, StopSignal, SystemClock};
use crate::startup::{self, StartupRegistrar};

/// Menu item IDs
mod menu_ids {
    pub const STARTUP: &str = "startup";
    pub const EXIT: &str = "exit";
}

/// Events delivered to the UI thread.
enum TrayEvent {
    Frame(Frame),
    Menu(MenuEvent),
    Icon(TrayIconEvent),
}

/// Scheduler side of the event loop: frames travel as user events so only
/// the UI thread ever touches the tray icon.
struct FrameForwarder(EventLoopProxy<TrayEvent>);

impl FrameSink for FrameForwarder {
    fn present(&self, frame: Frame) -> Result<(), SinkClosed> {
        self.0
            .send_event(TrayEvent::Frame(frame))
            .map_err(|_| SinkClosed)
    }
}

fn frame_icon(frame: Frame) -> Result<(Icon, String)> {
    let (width, height) = frame.image.dimensions();
    let icon = Icon::from_rgba(frame.image.into_raw(), width, height)
        .context("Rendered clock image is not a valid icon")?;
    Ok((icon, frame.tooltip))
}

/// The context menu: the launch-at-login checkbox and exit, nothing else.
fn build_menu(texts: &MenuTexts, registered: bool) -> Result<(Menu, CheckMenuItem)> {
    let menu = Menu::new();

    let startup_item =
        CheckMenuItem::with_id(menu_ids::STARTUP, texts.startup_label, true, registered, None);
    menu.append(&startup_item)?;

    let exit_item = MenuItem::with_id(menu_ids::EXIT, texts.exit_label, true, None);
    menu.append(&exit_item)?;

    Ok((menu, startup_item))
}

/// Application state for the tray icon
struct TrayApp {
    tray_icon: Option<TrayIcon>,
    startup_item: Option<CheckMenuItem>,
    renderer: ClockRenderer,
    texts: MenuTexts,
    registrar: Box<dyn StartupRegistrar>,
    stop: StopSignal,
    scheduler: Option<Scheduler<SystemClock, FrameForwarder>>,
    scheduler_thread: Option<JoinHandle<()>>,
    fatal: Option<anyhow::Error>,
}

impl TrayApp {
    fn new(
        renderer: ClockRenderer,
        texts: MenuTexts,
        registrar: Box<dyn StartupRegistrar>,
        stop: StopSignal,
        scheduler: Scheduler<SystemClock, FrameForwarder>,
    ) -> Self {
        Self {
            tray_icon: None,
            startup_item: None,
            renderer,
            texts,
            registrar,
            stop,
            scheduler: Some(scheduler),
            scheduler_thread: None,
            fatal: None,
        }
    }

    fn create_menu(&mut self) -> Result<Menu> {
        let (menu, startup_item) = build_menu(&self.texts, self.registrar.is_registered())?;
        self.startup_item = Some(startup_item);
        Ok(menu)
    }

    fn create_tray(&mut self) -> Result<()> {
        let menu = self.create_menu()?;
        let frame = Frame::render(&self.renderer, &chrono::Local::now());
        let (icon, tooltip) = frame_icon(frame)?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(tooltip)
            .with_icon(icon)
            .build()
            .context("Failed to create tray icon")?;

        self.tray_icon = Some(tray_icon);
        info!("System tray icon created");
        Ok(())
    }

    fn start_scheduler(&mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.take() {
            let handle = scheduler
                .spawn()
                .context("Failed to start clock scheduler thread")?;
            self.scheduler_thread = Some(handle);
        }
        Ok(())
    }

    /// Re-read the auto-start state into the checkbox.
    fn refresh_startup_item(&self) {
        if let Some(item) = &self.startup_item {
            item.set_checked(self.registrar.is_registered());
        }
    }

    fn show_frame(&mut self, frame: Frame) -> Result<()> {
        let Some(tray_icon) = &self.tray_icon else {
            return Ok(());
        };
        let (icon, tooltip) = frame_icon(frame)?;
        tray_icon.set_icon(Some(icon))?;
        tray_icon.set_tooltip(Some(&tooltip))?;
        debug!(time = %tooltip, "Tray icon updated");
        Ok(())
    }

    fn handle_menu_event(&mut self, event: MenuEvent, event_loop: &ActiveEventLoop) {
        match event.id.0.as_str() {
            menu_ids::STARTUP => {
                if let Err(e) = startup::toggle(self.registrar.as_ref()) {
                    error!(error = %e, "Failed to change startup registration");
                }
                self.refresh_startup_item();
            }
            menu_ids::EXIT => {
                info!("Exit requested from tray menu");
                self.shutdown(event_loop);
            }
            _ => {}
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!(error = %err, "Tray failed");
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.stop.stop();
        // Dropping the handle removes the icon from the notification area.
        self.tray_icon = None;
        event_loop.exit();
    }

    fn join_scheduler(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.scheduler_thread.take() {
            if handle.join().is_err() {
                error!("Clock scheduler thread panicked");
            }
        }
    }
}

impl ApplicationHandler<TrayEvent> for TrayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Create tray icon on first resume
        if self.tray_icon.is_none() && self.fatal.is_none() {
            let result = self.create_tray().and_then(|_| self.start_scheduler());
            if let Err(e) = result {
                self.fail(event_loop, e);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: TrayEvent) {
        match event {
            TrayEvent::Frame(frame) => {
                if let Err(e) = self.show_frame(frame) {
                    self.fail(event_loop, e);
                }
            }
            TrayEvent::Menu(event) => self.handle_menu_event(event, event_loop),
            // Any interaction with the icon may open the menu.
            TrayEvent::Icon(_) => self.refresh_startup_item(),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // We don't have any windows, just the tray icon
    }
}

/// Run the system tray application
pub fn run_tray(config: &Config) -> Result<()> {
    let canvas = config.canvas()?;
    let options = config.layout_options()?;
    let typeface = face::load_first(&config.font.candidates, &config.font.search_dirs);
    let renderer = ClockRenderer::new(typeface, canvas, options);
    let language = config.language();
    let registrar = startup::system_registrar()?;

    info!(
        width = canvas.width,
        height = canvas.height,
        layout = ?options.policy,
        language = ?language,
        "Starting TinyClock tray"
    );

    let event_loop = EventLoop::<TrayEvent>::with_user_event().build()?;

    let menu_proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = menu_proxy.send_event(TrayEvent::Menu(event));
    }));

    let icon_proxy = event_loop.create_proxy();
    TrayIconEvent::set_event_handler(Some(move |event| {
        let _ = icon_proxy.send_event(TrayEvent::Icon(event));
    }));

    let stop = StopSignal::new();
    let scheduler = Scheduler::new(
        renderer.clone(),
        SystemClock,
        FrameForwarder(event_loop.create_proxy()),
        stop.clone(),
    );

    let mut app = TrayApp::new(renderer, language.texts(), registrar, stop, scheduler);
    let run_result = event_loop.run_app(&mut app);
    app.join_scheduler();
    run_result?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => {
            info!("TinyClock exited");
            Ok(())
        }
    }
}
