//! Menu-driven session using `dialoguer`.
//!
//! Mirrors the checklist UI: prefectures grouped by region, select-all and
//! reset controls, and one active category. The chart is derived from the
//! current session state whenever "Show chart" or "Inspect a year" is
//! chosen.

use std::collections::BTreeSet;

use dialoguer::{MultiSelect, Select};
use resas_chart_chart::{ChartView, group_by_region};
use resas_chart_cli_utils::MultiProgress;
use resas_chart_population_models::PopulationCategory;
use resas_chart_region_models::PrefCode;
use resas_chart_session::{Session, SessionView};

use crate::{progress, render};

/// Actions available in the session menu.
enum Action {
    ChoosePrefectures,
    SelectAll,
    Reset,
    ChangeCategory,
    ShowChart,
    InspectYear,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ChoosePrefectures,
        Self::SelectAll,
        Self::Reset,
        Self::ChangeCategory,
        Self::ShowChart,
        Self::InspectYear,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ChoosePrefectures => "Choose prefectures",
            Self::SelectAll => "Select all",
            Self::Reset => "Reset",
            Self::ChangeCategory => "Change population category",
            Self::ShowChart => "Show chart",
            Self::InspectYear => "Inspect a year",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive loop until the user quits.
///
/// Expects the directory to have loaded already.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn run(
    mut session: Session,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        session.pump();
        println!();
        println!(
            "Category: {} | Selected: {} | Pending requests: {}",
            session.category().label_ja(),
            session.selected().len(),
            session.pending_fetches()
        );

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ChoosePrefectures => choose_prefectures(&mut session)?,
            Action::SelectAll => session.select_all(),
            Action::Reset => session.reset(),
            Action::ChangeCategory => change_category(&mut session)?,
            Action::ShowChart => {
                progress::settle(&mut session, multi, "Fetching population data").await;
                println!();
                println!("{}", render::view(&session.view(), session.category()));
            }
            Action::InspectYear => {
                progress::settle(&mut session, multi, "Fetching population data").await;
                inspect_year(&session)?;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Shows a region-grouped checklist and toggles every prefecture whose
/// checked state changed.
fn choose_prefectures(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let groups = group_by_region(session.prefectures());

    let mut codes: Vec<PrefCode> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    for group in &groups {
        for p in &group.prefectures {
            codes.push(p.code);
            labels.push(format!("[{}] {}", group.name, p.name));
        }
    }

    if codes.is_empty() {
        println!("No prefectures loaded.");
        return Ok(());
    }

    let defaults: Vec<bool> = codes.iter().map(|c| session.selected().contains(c)).collect();

    let chosen: BTreeSet<PrefCode> = MultiSelect::new()
        .with_prompt("Select prefectures (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .max_length(20)
        .interact()?
        .into_iter()
        .map(|i| codes[i])
        .collect();

    for (&code, &was_selected) in codes.iter().zip(&defaults) {
        if chosen.contains(&code) != was_selected {
            session.toggle(code);
        }
    }

    Ok(())
}

fn change_category(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<String> = PopulationCategory::ALL
        .iter()
        .map(|c| format!("{} ({})", c.label_ja(), c.label()))
        .collect();
    let current = PopulationCategory::ALL
        .iter()
        .position(|&c| c == session.category())
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Population category")
        .items(&labels)
        .default(current)
        .interact()?;

    session.change_category(PopulationCategory::ALL[idx]);
    Ok(())
}

/// Lets the user pick a year and prints its tooltip.
fn inspect_year(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let view = session.view();
    let SessionView::Ready(ChartView::Chart { series, table }) = &view else {
        println!("{}", render::view(&view, session.category()));
        return Ok(());
    };

    let years: Vec<String> = table.rows().iter().map(|r| r.year.to_string()).collect();
    let idx = Select::new()
        .with_prompt("Year")
        .items(&years)
        .default(0)
        .max_length(15)
        .interact()?;

    println!("{}", render::tooltip_text(&table.rows()[idx], series));
    Ok(())
}
