use crate::ui::{
    self,
    InputEventReceiver,
    UserEvent,
};
use color_eyre::eyre::Result;
use roulette_session::{
    Bet,
    Chips,
    Resolution,
    Resolver,
    RoundReport,
    Session,
    SessionState,
    Settlement,
    StagedBet,
    config::AppConfig,
    resolver::resolve_with_timeout,
};
use std::{
    collections::VecDeque,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time,
};
use tracing::{
    error,
    info,
    warn,
};

const MAX_ERRORS: usize = 50;
const VISIBLE_ERRORS: usize = 5;
const HISTORY_LEN: usize = 10;

pub type ResolutionSender = mpsc::UnboundedSender<(u64, Resolution)>;

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub bankroll: Chips,
    pub staked: Chips,
    pub chip: Chips,
    pub state: SessionState,
    pub resolver: &'static str,
    pub bets: Vec<StagedBet>,
    /// Most recent round first.
    pub history: Vec<RoundReport>,
    pub status: String,
    pub errors: Vec<String>,
}

pub struct AppController<R> {
    session: Session,
    resolver: R,
    resolver_label: &'static str,
    chip: Chips,
    timeout: Duration,
    status: String,
    errors: Vec<String>,
    history: VecDeque<RoundReport>,
}

impl<R> AppController<R>
where
    R: Resolver + Clone + Send + Sync + 'static,
{
    pub fn new(config: &AppConfig, resolver: R, resolver_label: &'static str) -> Self {
        Self {
            session: Session::new(config.bankroll),
            resolver,
            resolver_label,
            chip: config.chip,
            timeout: config.timeout,
            status: format!("Bankroll {}. Place your bets.", config.bankroll),
            errors: Vec::new(),
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let slip = self.session.staged();
        AppSnapshot {
            bankroll: self.session.bankroll(),
            staked: slip.total_staked(),
            chip: self.chip,
            state: self.session.state(),
            resolver: self.resolver_label,
            bets: slip.snapshot(),
            history: self.history.iter().cloned().collect(),
            status: self.status.clone(),
            errors: self
                .errors
                .iter()
                .rev()
                .take(VISIBLE_ERRORS)
                .rev()
                .cloned()
                .collect(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.session.state() == SessionState::AwaitingResolution
    }

    pub fn place_bet(&mut self, bet: Bet) {
        match self.session.stage(bet, self.chip) {
            Ok(()) => self.status = format!("Placed {} on {}", self.chip, bet),
            Err(err) => self.push_errors(vec![format!("Cannot place {bet}: {err}")]),
        }
    }

    pub fn set_chip(&mut self, chip: Chips) {
        self.chip = chip;
        self.status = format!("Chip value set to {chip}");
    }

    pub fn remove(&mut self, index: usize) {
        match self.session.unstage(index) {
            Ok(removed) => {
                self.status = format!("Removed {} ({} returned)", removed.bet(), removed.stake())
            }
            Err(err) => self.push_errors(vec![format!("Cannot remove bet: {err}")]),
        }
    }

    pub fn clear(&mut self) {
        match self.session.clear() {
            Ok(refunded) if refunded.is_zero() => self.status = String::from("Bet slip is already empty"),
            Ok(refunded) => self.status = format!("Cleared bet slip ({refunded} returned)"),
            Err(err) => self.push_errors(vec![format!("Cannot clear bets: {err}")]),
        }
    }

    /// Submits the slip and resolves it on a background task; the result is
    /// delivered on `results` and applied with [`AppController::finish_spin`].
    pub fn start_spin(&mut self, results: &ResolutionSender) {
        let submission = match self.session.begin_spin() {
            Ok(submission) => submission,
            Err(err) => {
                self.push_errors(vec![format!("Cannot spin: {err}")]);
                return;
            }
        };
        self.status = format!("Spinning with {} staked...", submission.total());
        let resolver = self.resolver.clone();
        let timeout = self.timeout;
        let results = results.clone();
        tokio::spawn(async move {
            let resolution = resolve_with_timeout(&resolver, &submission.bets, timeout).await;
            if results.send((submission.round, resolution)).is_err() {
                warn!(round = submission.round, "controller gone before spin resolved");
            }
        });
    }

    pub fn finish_spin(&mut self, round: u64, resolution: Resolution) {
        let report = match self.session.complete_spin(round, resolution) {
            Ok(report) => report,
            Err(err) => {
                self.push_errors(vec![format!("Discarded resolution for round {round}: {err}")]);
                return;
            }
        };
        match &report.settlement {
            Settlement::Settled(outcome) => {
                self.status = format!(
                    "{} {}! Bankroll is now {}",
                    outcome.pocket, outcome.color, report.balance_after
                );
            }
            Settlement::Refunded { failure, refunded } => {
                self.status = format!("Spin failed, {refunded} returned to your bankroll");
                self.push_errors(vec![failure.to_string()]);
            }
        }
        self.history.push_front(report);
        self.history.truncate(HISTORY_LEN);
    }

    fn push_errors(&mut self, mut items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        for item in &items {
            error!("{}", item);
        }
        self.errors.append(&mut items);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }
}

pub async fn run_app<R>(config: &AppConfig, resolver: R, resolver_label: &'static str) -> Result<()>
where
    R: Resolver + Clone + Send + Sync + 'static,
{
    let mut controller = AppController::new(config, resolver, resolver_label);
    let mut ui_state = ui::UiState::default();
    let input = InputEventReceiver::spawn();
    info!(resolver = resolver_label, bankroll = %config.bankroll, "session started");

    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut controller, &mut ui_state, input).await;
    ui::terminal_exit()?;

    if controller.is_busy() {
        warn!("exited while a spin was awaiting resolution");
    }
    info!(bankroll = %controller.session.bankroll(), "session ended");
    res
}

async fn run_loop<R>(
    controller: &mut AppController<R>,
    ui_state: &mut ui::UiState,
    mut input: InputEventReceiver,
) -> Result<()>
where
    R: Resolver + Clone + Send + Sync + 'static,
{
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let mut ticker = time::interval(Duration::from_millis(100));
    ui::draw(ui_state, &controller.snapshot())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            Some((round, resolution)) = results_rx.recv() => {
                controller.finish_spin(round, resolution);
            }
            _ = ticker.tick() => {
                if !controller.is_busy() {
                    continue;
                }
                ui_state.advance_spinner();
            }
            ev = input.next_raw_event() => {
                let Some(ev) = ev else { break };
                let slip_len = controller.session.staged().len();
                match ui::interpret_event(ui_state, ev, slip_len) {
                    None => continue,
                    Some(UserEvent::Quit) => break,
                    Some(UserEvent::Redraw) => {}
                    Some(UserEvent::PlaceBet(bet)) => controller.place_bet(bet),
                    Some(UserEvent::SetChip(chip)) => controller.set_chip(chip),
                    Some(UserEvent::Remove(index)) => controller.remove(index),
                    Some(UserEvent::ClearSlip) => controller.clear(),
                    Some(UserEvent::Spin) => controller.start_spin(&results_tx),
                    Some(UserEvent::InvalidInput(message)) => controller.push_errors(vec![message]),
                }
            }
        }
        ui::draw(ui_state, &controller.snapshot())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use roulette_session::{
        Pocket,
        bet::ColorPick,
        config::ResolverConfig,
        test_helpers::ScriptedResolver,
    };
    use std::path::PathBuf;

    fn config(bankroll: u64, chip: u64) -> AppConfig {
        AppConfig {
            resolver: ResolverConfig::House { seed: None },
            bankroll: Chips::from_units(bankroll),
            chip: Chips::from_units(chip),
            timeout: Duration::from_secs(1),
            log_dir: PathBuf::from(".logs"),
        }
    }

    #[tokio::test]
    async fn start_spin__delivers_resolution_and_settles() {
        // given
        let resolver = ScriptedResolver::new();
        resolver.push_settled(Pocket::from_number(17).unwrap(), Chips::from_units(90));
        let mut controller = AppController::new(&config(100, 10), resolver.clone(), "scripted");
        controller.place_bet(Bet::Color(ColorPick::Red));
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when
        controller.start_spin(&tx);
        assert!(controller.is_busy());
        let (round, resolution) = rx.recv().await.unwrap();
        controller.finish_spin(round, resolution);

        // then
        let snap = controller.snapshot();
        assert_eq!(snap.bankroll, Chips::from_units(90));
        assert!(snap.bets.is_empty());
        assert_eq!(snap.state, SessionState::Idle);
        assert_eq!(snap.history.len(), 1);
        assert_eq!(resolver.submissions().len(), 1);
    }

    #[tokio::test]
    async fn finish_spin__failure_refunds_and_reports_error() {
        let resolver = ScriptedResolver::new();
        resolver.push_transport_failure("connection refused");
        let mut controller = AppController::new(&config(100, 25), resolver, "scripted");
        controller.place_bet(Bet::Color(ColorPick::Red));
        let (tx, mut rx) = mpsc::unbounded_channel();

        controller.start_spin(&tx);
        let (round, resolution) = rx.recv().await.unwrap();
        controller.finish_spin(round, resolution);

        let snap = controller.snapshot();
        assert_eq!(snap.bankroll, Chips::from_units(100));
        assert_eq!(snap.errors, vec!["transport failure: connection refused".to_string()]);
    }

    #[test]
    fn place_bet__reports_insufficient_funds() {
        let mut controller = AppController::new(&config(15, 10), ScriptedResolver::new(), "scripted");

        controller.place_bet(Bet::Color(ColorPick::Red));
        controller.place_bet(Bet::Color(ColorPick::Red));

        let snap = controller.snapshot();
        assert_eq!(snap.bets.len(), 1);
        assert_eq!(snap.bankroll, Chips::from_units(5));
        assert_eq!(snap.errors.len(), 1);
    }

    #[test]
    fn push_errors__keeps_a_bounded_list() {
        let mut controller = AppController::new(&config(15, 10), ScriptedResolver::new(), "scripted");

        controller.push_errors((0..60).map(|i| format!("error {i}")).collect());

        assert_eq!(controller.errors.len(), MAX_ERRORS);
        assert_eq!(controller.errors.first().map(String::as_str), Some("error 10"));
        assert_eq!(
            controller.snapshot().errors,
            (55..60).map(|i| format!("error {i}")).collect::<Vec<_>>()
        );
    }

    #[test]
    fn history__keeps_the_last_ten_rounds() {
        let mut controller = AppController::new(&config(100, 1), ScriptedResolver::new(), "scripted");
        for _ in 0..12 {
            controller.place_bet(Bet::Color(ColorPick::Black));
            let submission = controller.session.begin_spin().unwrap();
            let bankroll = controller.session.bankroll();
            controller.finish_spin(
                submission.round,
                Resolution::Settled(roulette_session::Outcome {
                    pocket: Pocket::ZERO,
                    color: Pocket::ZERO.color(),
                    bankroll,
                    winnings: None,
                }),
            );
        }
        let snap = controller.snapshot();
        assert_eq!(snap.history.len(), HISTORY_LEN);
        assert_eq!(snap.history.first().map(|r| r.round), Some(12));
    }
}
