use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::config::KeyResolver;
use crate::dashboard::Dashboard;
use crate::executor::{EffectRunner, Executor};
use crate::log_ring::LogRing;
use crate::message::Message;
use crate::model::ManagerEntry;
use crate::tui::{Event, Tui};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 10.0;

pub struct App {
    dashboard: Dashboard,
    executor: Arc<Executor>,
    runner: EffectRunner,
    theme: Theme,
    message_tx: UnboundedSender<Message>,
    message_rx: UnboundedReceiver<Message>,
}

impl App {
    pub fn new(
        managers: &[ManagerEntry],
        ring: LogRing,
        resolver: Arc<KeyResolver>,
        theme: Theme,
        dry_run: bool,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let executor = Arc::new(Executor::new(managers, dry_run));
        Self {
            dashboard: Dashboard::new(managers, ring, resolver),
            runner: EffectRunner::new(Arc::clone(&executor), message_tx.clone()),
            executor,
            theme,
            message_tx,
            message_rx,
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.runner.run(self.dashboard.init());

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages()?;
            if self.dashboard.should_quit() {
                break;
            }
        }

        tui.exit()?;
        drop(tui);

        info!("Shutting down");
        self.executor.dispose().await;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        let message = match event {
            Event::Quit => Message::Quit,
            Event::Tick => Message::Tick,
            Event::Key(key) => Message::Key(key),
            Event::Render => return self.render(tui),
            Event::Resize => {
                tui.autoresize()?;
                return self.render(tui);
            }
            Event::Error(err) => {
                warn!("Terminal input error: {err}");
                return Ok(());
            }
        };
        self.message_tx.send(message)?;
        Ok(())
    }

    /// Handle everything queued so far, one message at a time.
    fn handle_messages(&mut self) -> color_eyre::Result<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            if !matches!(message, Message::Tick) {
                debug!("Handling message: {message:?}");
            }
            for effect in self.dashboard.dispatch(message)? {
                self.runner.run(effect);
            }
        }
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        tui.draw(|frame| self.dashboard.render(frame, &self.theme))?;
        Ok(())
    }
}
