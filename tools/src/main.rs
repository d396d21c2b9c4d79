//! dues-runner: headless collector dues dashboard.
//!
//! Usage:
//!   dues-runner --demo-seed 42 --collector North
//!   dues-runner --db dues.db --collector North --now 2024-01-01T00:00:00Z
//!   dues-runner --demo-seed 42 --ipc-mode

use anyhow::{bail, Context, Result};
use dues_core::{
    clock::{Clock, FixedClock, SystemClock},
    command::DashboardCommand,
    config::DuesConfig,
    coordinator::{SnapshotCoordinator, SnapshotState},
    demo::seed_demo_data,
    event::DashboardEvent,
    member::{format_timestamp, parse_timestamp},
    snapshot::StatisticsSnapshot,
    store::DuesStore,
    summary::{format_percentage, CollectionSummary},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Serialize)]
struct UiState {
    state:     &'static str,
    collector: Option<String>,
    snapshot:  Option<StatisticsSnapshot>,
    summary:   Option<CollectionSummary>,
    error:     Option<String>,
    events:    Vec<DashboardEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let collector = flag_value(&args, "--collector");
    let demo_seed = match flag_value(&args, "--demo-seed") {
        Some(raw) => Some(
            raw.parse::<u64>()
                .with_context(|| format!("--demo-seed expects an unsigned integer, got '{raw}'"))?,
        ),
        None => None,
    };
    let clock: Box<dyn Clock> = match flag_value(&args, "--now") {
        Some(raw) => match parse_timestamp(raw) {
            Some(now) => Box::new(FixedClock::at(now)),
            None => bail!("--now expects an ISO-8601 timestamp, got '{raw}'"),
        },
        None => Box::new(SystemClock),
    };

    let config = DuesConfig::load_or_default(data_dir)?;

    if !ipc_mode {
        println!("Collector Dues Dashboard: dues-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  collector: {}", collector.unwrap_or("(none)"));
        println!("  now:       {}", format_timestamp(clock.now()));
        println!();
    }

    let store = if db == ":memory:" {
        DuesStore::in_memory()?
    } else {
        DuesStore::open(db)?
    };
    store.migrate()?;

    if let Some(seed) = demo_seed {
        seed_demo_data(&store, &config.demo, seed, clock.now())?;
    }

    let mut coordinator = SnapshotCoordinator::new(config.policy);

    if ipc_mode {
        if collector.is_some() {
            coordinator.load(collector, &store, clock.as_ref());
        }
        run_ipc_loop(&mut coordinator, &store, clock.as_ref())?;
    } else {
        let state = coordinator.load(collector, &store, clock.as_ref());
        print_summary(&coordinator, &store, &state)?;
    }

    Ok(())
}

fn run_ipc_loop(
    coordinator: &mut SnapshotCoordinator,
    store: &DuesStore,
    clock: &dyn Clock,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: DashboardCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Ignoring malformed command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            DashboardCommand::Quit => break,
            DashboardCommand::Select { collector } => {
                coordinator.load(collector.as_deref(), store, clock);
            }
            DashboardCommand::Refresh => {
                coordinator.reload(store, clock);
            }
            DashboardCommand::GetState => {}
        }

        let state = build_ui_state(coordinator);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(coordinator: &mut SnapshotCoordinator) -> UiState {
    let state = coordinator.state();
    let snapshot = state.snapshot().map(|s| (**s).clone());
    let summary = snapshot
        .as_ref()
        .map(|s| CollectionSummary::from_snapshot(s, coordinator.policy()));
    let error = match &state {
        SnapshotState::Failed(e) => Some(e.to_string()),
        _ => None,
    };

    UiState {
        state: state.label(),
        collector: coordinator.selected().map(str::to_string),
        snapshot,
        summary,
        error,
        events: coordinator.drain_events(),
    }
}

fn print_summary(
    coordinator: &SnapshotCoordinator,
    store: &DuesStore,
    state: &SnapshotState,
) -> Result<()> {
    let snapshot = match state {
        SnapshotState::Ready(snapshot) => snapshot,
        SnapshotState::Unavailable => {
            let collectors = store.collector_names()?;
            println!("No collector selected (--collector <name>).");
            if !collectors.is_empty() {
                println!("  known collectors: {}", collectors.join(", "));
            }
            return Ok(());
        }
        SnapshotState::Failed(e) => bail!("Statistics unavailable: {e}"),
        SnapshotState::Loading => bail!("Fetch did not complete"),
    };
    let summary = CollectionSummary::from_snapshot(snapshot, coordinator.policy());
    let yearly = &snapshot.yearly_payments;
    let emergency = &snapshot.emergency_collections;

    println!("=== COLLECTOR SUMMARY ===");
    println!("  collector:        {}", coordinator.selected().unwrap_or_default());
    println!("  total members:    {}", snapshot.total_members);
    println!(
        "  active/inactive:  {}/{}",
        snapshot.membership_stats.active, snapshot.membership_stats.inactive
    );
    println!("  new members:      {}", snapshot.membership_stats.new_members);

    println!();
    println!("=== YEARLY PAYMENTS ===");
    println!(
        "  completed:        {} ({})",
        yearly.completed,
        format_percentage(summary.yearly_completion_pct)
    );
    println!("  pending:          {}", yearly.pending);
    println!("  remaining:        {}", summary.remaining_members);
    println!("  overdue:          {}", yearly.overdue);
    println!(
        "  collected:        ${:.2} of ${:.2}",
        summary.collected_yearly_amount, summary.total_yearly_amount
    );
    println!(
        "  next due date:    {}",
        yearly
            .next_due_date
            .map(format_timestamp)
            .unwrap_or_else(|| "none".into())
    );

    println!();
    println!("=== EMERGENCY COLLECTIONS ===");
    println!(
        "  completed:        {} ({})",
        emergency.completed,
        format_percentage(summary.emergency_completion_pct)
    );
    println!("  pending:          {}", emergency.pending);
    println!("  collected:        ${:.2}", emergency.total_collected);

    println!();
    println!("=== PENDING REQUESTS & ACTIVITY ===");
    println!("  pending requests: {}", snapshot.pending_payments.count);
    println!("  pending amount:   ${:.2}", snapshot.pending_payments.amount);
    println!("  recent payments:  {}", snapshot.recent_activity.recent_payments);
    println!(
        "  last payment:     {}",
        snapshot
            .recent_activity
            .last_payment_date
            .map(format_timestamp)
            .unwrap_or_else(|| "none".into())
    );
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
