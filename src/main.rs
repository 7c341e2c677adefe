mod cli;
mod error;
mod lib;
mod load;

use clap::ArgMatches;
use std::path::{Path, PathBuf};

use cli::{
    export,
    plot::Plotter,
    report::{Dashboard, Selection},
    table::Table,
    Shared,
};
use error::{MilelogError, Result};
use lib::{
    date::Date,
    entry::find_vehicle,
    history::{unified_history, view},
    metrics::reminder_needed,
    summary::{Calendar, Duration},
    trip::estimate_all,
    units::Preferences,
};
use load::Logbook;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = cli::app().get_matches();
    let (name, sub) = matches.subcommand();
    let shared = Shared::from(&matches, sub);
    let prefs = load::config::load_preferences(shared.config.map(Path::new))?;

    let filename = matches.value_of("FILE").unwrap_or_default();
    let mut errs = load::error::Record::new();
    let book = load::read_logbook(filename, &mut errs);
    if !errs.is_empty() {
        eprint!("{}", errs);
    }
    let book = book.ok_or_else(|| MilelogError::Logbook(filename.to_string()))?;

    let today = Date::today();
    let period = shared.active_period(today)?;
    if let Some(id) = shared.vehicle {
        if find_vehicle(&book.vehicles, id).is_none() {
            log::warn!("vehicle '{}' is not declared in {}", id, filename);
        }
    }
    if prefs.reminders && reminder_needed(&book.entries, today) {
        eprintln!("Reminder: today's odometer reading has not been logged yet");
    }
    let sel = Selection::new(&book, period, shared.vehicle);
    let args = sub.unwrap_or(&matches);
    match name {
        "summary" => show_summary(&sel, &book, &prefs, args, today),
        "history" => show_history(&sel, &book, &prefs, args),
        "export" => export_csv(&sel, &book, args),
        "plot" => plot_svg(&sel, &book, args),
        "trips" => show_trips(&sel, &book, &prefs),
        "vehicles" => {
            print!("{}", Table::vehicles(&sel.vehicles, &prefs));
            Ok(())
        }
        _ => Ok(()),
    }
}

fn calendar(sel: &Selection, book: &Logbook, by: Duration) -> Option<Calendar> {
    let period = sel.chart_period()?;
    let mut cal = Calendar::from_spacing(period, by, 1, &sel.vehicles);
    cal.register(&sel.entries, &sel.fillups, &book.vehicles);
    Some(cal)
}

fn show_summary(sel: &Selection, book: &Logbook, prefs: &Preferences, args: &ArgMatches, today: Date) -> Result<()> {
    let dash = Dashboard::build(sel, &book.vehicles, today);
    if args.is_present("json") {
        println!("{}", dash.to_json()?);
        return Ok(());
    }
    print!("{}", dash.display(prefs));
    if let Some(by) = cli::duration(args)? {
        match calendar(sel, book, by) {
            Some(cal) => print!("{}", Table::calendar(&cal, prefs).with_title("Calendar")),
            None => println!(" No records in {}", sel.period),
        }
    }
    Ok(())
}

fn show_history(sel: &Selection, book: &Logbook, prefs: &Preferences, args: &ArgMatches) -> Result<()> {
    let items = unified_history(&sel.entries, &sel.fillups, &book.vehicles);
    let items = view(items, cli::kind(args)?, args.is_present("ascending"));
    if items.is_empty() {
        println!(" No records in {}", sel.period);
    } else {
        print!("{}", Table::history(&items, prefs));
    }
    Ok(())
}

fn export_csv(sel: &Selection, book: &Logbook, args: &ArgMatches) -> Result<()> {
    let items = view(
        unified_history(&sel.entries, &sel.fillups, &book.vehicles),
        cli::kind(args)?,
        args.is_present("ascending"),
    );
    let csv = export::to_csv(&items);
    match args.value_of("output") {
        Some(path) => {
            std::fs::write(path, csv).map_err(|source| MilelogError::FileWrite {
                path: PathBuf::from(path),
                source,
            })?;
            log::info!("{} records exported to {}", items.len(), path);
        }
        None => print!("{}", csv),
    }
    Ok(())
}

fn show_trips(sel: &Selection, book: &Logbook, prefs: &Preferences) -> Result<()> {
    if sel.trips.is_empty() {
        println!(" No trips in {}", sel.period);
        return Ok(());
    }
    // prices are averaged over every fill-up of the vehicle, not only the selected ones
    let trips = estimate_all(&sel.trips, &book.fillups, &book.vehicles);
    print!("{}", Table::trips(&trips, &book.vehicles, prefs));
    Ok(())
}

fn plot_svg(sel: &Selection, book: &Logbook, args: &ArgMatches) -> Result<()> {
    let by = cli::duration(args)?.unwrap_or(Duration::Day);
    let path = args.value_of("output").unwrap_or("milelog.svg");
    let document = calendar(sel, book, by)
        .and_then(|cal| Plotter::from(cal.items(), cal.labels()).cumulative_document());
    match document {
        Some(document) => {
            svg::save(path, &document).map_err(|source| MilelogError::FileWrite {
                path: PathBuf::from(path),
                source,
            })?;
            println!(" Plot written to {}", path);
        }
        None => log::warn!("nothing to plot in {}", sel.period),
    }
    Ok(())
}
