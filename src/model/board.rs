use chrono::{Days, NaiveDate};
use chronoutil::DateRule;
use color_eyre::eyre::{eyre, Context as EyreContext, Result};
use include_dir::{
    include_dir, Dir,
    DirEntry::{Dir as DirEnt, File as FileEnt},
};
use itertools::Itertools;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::iter;
use std::path::PathBuf;
use tera::{Context, Tera};

use super::day::DayContext;
use super::event::EventRecord;
use super::grid::SlotGrid;
use super::week::Week;
use crate::configuration::config::Config;
use crate::store::{EventStore, PendingDelete};
use crate::util::{compile_stylesheet, delete_dir_contents, write_template};
use crate::views::week_view::WeekView;

pub(crate) type EventsByDay = BTreeMap<NaiveDate, Vec<EventRecord>>;

static TEMPLATE_DIR: Dir = include_dir!("templates");
static ASSET_DIR: Dir = include_dir!("assets");

pub const DEFAULT_STYLESHEET: &str = include_str!("../../assets/weekboard.sass");

/// The whole board: configuration, the event store, and the stored events
/// grouped by day, ready to be rendered week by week.
#[derive(Debug)]
pub struct Board {
    store: EventStore,
    /// Events grouped by day, each day ordered by start time
    pub(crate) events_by_day: EventsByDay,

    pub(crate) tera: Tera,
    pub(crate) config: Config,
    pub(crate) grid: SlotGrid,
}

impl Board {
    pub fn new(config: Config) -> Result<Board> {
        let store = EventStore::open(&config.base_dir.join(&config.store_path))?;
        let events_by_day = group_events(store.load_all()?);
        debug!(
            "loaded {} events over {} days",
            events_by_day.values().map(Vec::len).sum::<usize>(),
            events_by_day.len()
        );

        // load custom tera templates
        debug!("loading custom templates...");
        let template_glob = config
            .base_dir
            .join(&config.template_path)
            .join("**")
            .join("*.html");
        let mut tera = Tera::new(&template_glob.to_string_lossy())?;

        // load default tera templates
        debug!("loading default templates...");
        let mut default_templates = Tera::default();
        for template in TEMPLATE_DIR.find("**/*.html")? {
            match template {
                DirEnt(_) => Ok(()),
                FileEnt(t) => match (t.path().to_str(), t.contents_utf8()) {
                    (Some(template_name), Some(template_contents)) => {
                        debug!("adding default template: {}", template_name);
                        default_templates.add_raw_template(template_name, template_contents)
                    }
                    (_, _) => Ok(()),
                },
            }?;
        }

        // combine the defaults with the custom templates
        tera.extend(&default_templates)?;

        let grid = SlotGrid::from_config(&config);

        Ok(Board {
            store,
            events_by_day,
            tera,
            config,
            grid,
        })
    }

    /// Re-read the grouped events from the store after a mutation
    pub fn refresh(&mut self) -> Result<()> {
        self.events_by_day = group_events(self.store.load_all()?);
        Ok(())
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate and persist a new record, then refresh the grouping.
    /// Returns the storage key.
    pub fn add_event(&mut self, record: EventRecord) -> Result<String> {
        EventRecord::check_duration(record.start, record.end)?;
        let key = self.store.save_event(&record)?;
        self.refresh()?;

        Ok(key)
    }

    /// Begin deleting the record under the given key; call
    /// [`Board::refresh`] after confirming.
    pub fn request_delete(&mut self, key: &str) -> PendingDelete<'_> {
        self.store.request_delete(key)
    }

    pub fn today(&self) -> NaiveDate {
        self.config.today_date
    }

    /// The week containing the configured today
    pub fn current_week(&self) -> Result<Week> {
        Week::containing(self.today())
    }

    /// Returns the weeks to show on this [`Board`].
    ///
    /// The range runs from the earliest stored event to the latest, always
    /// widened to include today. A leading and trailing `None` are added so
    /// that 3-wide windows yield the previous and next week of every page.
    pub fn weeks_to_show(&self) -> Result<Vec<Option<Week>>> {
        let today = self.today();
        let first_day = self
            .events_by_day
            .keys()
            .next()
            .map_or(today, |first| today.min(*first));
        let last_day = self
            .events_by_day
            .keys()
            .next_back()
            .map_or(today, |last| today.max(*last));

        let first_week = Week::containing(first_day)?;
        let last_week = Week::containing(last_day)?;
        let range_end = last_week
            .start()
            .checked_add_days(Days::new(1))
            .ok_or(eyre!("could not create the aligned week end"))?;

        // setup a DateRule to iterate over the week anchors
        let weeks_iterator = DateRule::weekly(first_week.start()).with_end(range_end);
        let mut weeks_to_show: Vec<Option<Week>> = vec![];
        for anchor in weeks_iterator {
            weeks_to_show.push(Some(Week::containing(anchor)?));
        }

        let chained_iter = iter::once(None)
            .chain(weeks_to_show)
            .chain(iter::once(None));
        Ok(chained_iter.collect())
    }

    /// The day column context for one date
    pub(crate) fn day_context(&self, date: NaiveDate) -> DayContext {
        let events = self
            .events_by_day
            .get(&date)
            .map(|events| {
                events
                    .iter()
                    .map(|event| event.context(&self.grid, &self.config))
                    .collect()
            })
            .unwrap_or_default();

        DayContext::new(date, date == self.today(), events)
    }

    /// Generate the template context with the values shared by all pages
    #[must_use]
    pub fn template_context(&self) -> Context {
        let mut context = Context::new();
        context.insert(
            "stylesheet_path",
            &self
                .config
                .base_url_path
                .join(&*self.config.stylesheet_path),
        );
        context.insert("week_view_path", &self.config.base_url_path.join("week"));
        context.insert("hour_labels", &self.grid.hour_labels());
        context.insert("slot_height", &self.grid.slot_height());
        context.insert("header_height", &self.grid.header_height());
        context.insert("column_height", &self.grid.column_height());

        context
    }

    pub fn write_template(
        &self,
        template_name: &str,
        context: &Context,
        file_path: &std::path::Path,
    ) -> Result<()> {
        write_template(&self.tera, template_name, context, file_path)
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.config.base_dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.base_dir.join(&self.config.output_dir)
    }

    pub fn setup_output_dir(&self) -> Result<()> {
        let output_dir = &self.output_dir();

        // make the output dir if it doesn't exist
        fs::create_dir_all(output_dir)
            .context(format!("could not create output dir: {:?}", output_dir))?;

        if self.config.no_delete {
            info!("skipping delete of output directory as instructed...")
        } else {
            info!(
                "removing contents of the output directory: {:?}",
                output_dir
            );
            delete_dir_contents(output_dir);
        }

        // create the styles dir
        let styles_dir = output_dir.join("styles");
        create_dir_all(&styles_dir)?;

        if self.config.copy_stylesheet_to_output {
            let stylesheet_source = self.config.base_dir.join(&self.config.copy_stylesheet_from);
            let css = compile_stylesheet(&stylesheet_source, DEFAULT_STYLESHEET)?;
            let stylesheet_destination = styles_dir.join("style.css");
            fs::write(&stylesheet_destination, css).context(format!(
                "could not write stylesheet to destination: {:?}",
                stylesheet_destination
            ))?;
        }

        Ok(())
    }

    /// Render everything: output dir, stylesheet, and one page per week
    pub fn create_html_pages(&self) -> Result<()> {
        self.setup_output_dir()?;
        WeekView::new(self).create_html_pages()
    }

    /// Restore any default template missing from the configured template path
    pub fn restore_missing_templates(config: &Config) -> Result<()> {
        restore_missing(&TEMPLATE_DIR, &config.base_dir.join(&config.template_path))
    }

    /// Restore any default asset missing from the configured assets path
    pub fn restore_missing_assets(config: &Config) -> Result<()> {
        restore_missing(&ASSET_DIR, &config.base_dir.join(&config.assets_path))
    }
}

fn restore_missing(dir: &Dir, target_base: &std::path::Path) -> Result<()> {
    for entry in dir.entries() {
        match entry {
            DirEnt(sub) => restore_missing(sub, target_base)?,
            FileEnt(file) => {
                let target = target_base.join(file.path());
                if !target.exists() {
                    info!("restoring missing file: {:?}", target);
                    if let Some(parent) = target.parent() {
                        create_dir_all(parent)?;
                    }
                    fs::write(&target, file.contents())
                        .context(format!("could not restore file: {:?}", target))?;
                }
            }
        }
    }

    Ok(())
}

fn group_events(events: Vec<EventRecord>) -> EventsByDay {
    let mut events_by_day = EventsByDay::new();
    for event in events
        .into_iter()
        .sorted_by_key(|event| (event.day, event.start))
    {
        events_by_day.entry(event.day).or_default().push(event);
    }

    events_by_day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(day: NaiveDate, hour: u32, minute: u32, title: &str) -> EventRecord {
        EventRecord {
            title: title.into(),
            day,
            start: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            end: NaiveTime::from_hms_opt(hour + 1, minute, 0).unwrap(),
            kind: "Massage".into(),
            capacity: String::new(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_board(dir: &TempDir) -> Board {
        let mut config = Config::default();
        config.base_dir = dir.path().to_path_buf();
        config.today_date = date(2024, 6, 3);
        Board::new(config).unwrap()
    }

    #[test]
    fn days_group_their_events_ordered_by_start() {
        let wednesday = date(2024, 6, 5);
        let grouped = group_events(vec![
            record(wednesday, 14, 0, "Afternoon"),
            record(date(2024, 6, 6), 9, 0, "Thursday"),
            record(wednesday, 9, 30, "Morning"),
        ]);

        assert_eq!(grouped.len(), 2);
        let titles: Vec<&str> = grouped[&wednesday]
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Morning", "Afternoon"]);
    }

    #[test]
    fn an_empty_board_still_shows_the_current_week() {
        let dir = TempDir::new().unwrap();
        let board = test_board(&dir);

        let weeks = board.weeks_to_show().unwrap();
        // one week plus the None padding on both ends
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0], None);
        assert_eq!(weeks[1], Some(board.current_week().unwrap()));
        assert_eq!(weeks[2], None);
    }

    #[test]
    fn the_week_range_is_widened_to_include_today() {
        let dir = TempDir::new().unwrap();
        let mut board = test_board(&dir);

        // two weeks after the configured today
        board.add_event(record(date(2024, 6, 19), 10, 0, "Later")).unwrap();

        let weeks: Vec<Week> = board
            .weeks_to_show()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].start(), date(2024, 6, 3));
        assert_eq!(weeks[2].start(), date(2024, 6, 17));
    }

    #[test]
    fn day_contexts_carry_only_that_days_events() {
        let dir = TempDir::new().unwrap();
        let mut board = test_board(&dir);

        board
            .add_event(record(date(2024, 6, 5), 10, 0, "Back massage"))
            .unwrap();

        assert_eq!(board.day_context(date(2024, 6, 5)).events.len(), 1);
        assert_eq!(board.day_context(date(2024, 6, 6)).events.len(), 0);
    }

    #[test]
    fn adding_a_too_short_event_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let mut board = test_board(&dir);

        let mut short = record(date(2024, 6, 5), 9, 0, "Too short");
        short.end = NaiveTime::from_hms_opt(9, 10, 0).unwrap();

        assert!(board.add_event(short).is_err());
        assert_eq!(board.store().load_all().unwrap(), vec![]);
    }
}
