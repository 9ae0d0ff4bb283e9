use color_eyre::eyre::{Context as EyreContext, Result};
use log::debug;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use crate::model::board::Board;
use crate::model::day::DayContext;
use crate::model::week::Week;
use crate::util::{embed_in_page, render};

/// A triple with the previous, current, and next weeks present
///
/// Note that the previous and next weeks may be None
pub type WeekSlice<'a> = &'a [Option<Week>];

pub const VIEW_PATH: &str = "week";

#[derive(Debug)]
pub struct WeekView<'a> {
    board: &'a Board,
    output_dir: PathBuf,
}

impl WeekView<'_> {
    pub fn new(board: &Board) -> WeekView<'_> {
        let output_dir = board.output_dir().join(VIEW_PATH);
        WeekView { board, output_dir }
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Loops through all of the weeks on the board and writes a page for each.
    ///
    /// The page of the week containing today is also written as the view
    /// index and as the main site index.
    ///
    /// # Errors
    ///
    /// This function will return an error if templates cannot be written.
    pub fn create_html_pages(&self) -> Result<()> {
        // create the subdirectory to hold the files
        create_dir_all(self.output_dir())?;

        let current_week = self.board.current_week()?;

        // iterate through all windows
        for window in self.board.weeks_to_show()?.windows(3) {
            let week = window[1]
                .as_ref()
                .expect("the current week of a window is None, this should never happen");
            let write_index = *week == current_week;
            self.write_view(&window, write_index)?;
        }

        Ok(())
    }

    /// Takes a `WeekSlice` and writes the corresponding file
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be written to disk.
    fn write_view(&self, week_slice: &WeekSlice, write_index: bool) -> Result<()> {
        let previous_week = &week_slice[0].as_ref();
        let current_week = week_slice[1]
            .as_ref()
            .expect("the current week of a window is None, this should never happen");
        let next_week = &week_slice[2].as_ref();

        // week pages link each other through the base url
        let mut view_url_path = self.board.config.base_url_path.path_buf().clone();
        view_url_path.push(VIEW_PATH);

        let previous_file_name = previous_week.and_then(|week| {
            view_url_path
                .join(week.file_name())
                .to_str()
                .map(String::from)
        });
        let next_file_name = next_week.and_then(|week| {
            view_url_path
                .join(week.file_name())
                .to_str()
                .map(String::from)
        });

        // setup the tera context
        let mut context = self.board.template_context();
        context.insert(
            "view_date",
            &current_week
                .format(&self.board.config.week_view_format)
                .to_string(),
        );
        let week_dates: Vec<DayContext> = current_week
            .days()
            .map(|day| self.board.day_context(day))
            .collect();
        context.insert("week_dates", &week_dates);
        context.insert("previous_file_name", &previous_file_name);
        context.insert("next_file_name", &next_file_name);

        let mut file_paths = vec![self.output_dir().join(current_week.file_name())];
        if write_index {
            file_paths.push(self.output_dir().join("index.html"));
            file_paths.push(self.board.output_dir().join("index.html"));
        }

        debug!("{} file paths to write", file_paths.len());
        for file_path in file_paths {
            self.board.write_template("week.html", &context, &file_path)?;
        }

        // the index week can additionally be embedded into an existing page
        if write_index {
            if let Some(host_page) = &self.board.config.embed_in_page {
                self.write_embedded(&context, host_page)?;
            }
        }

        Ok(())
    }

    /// Render the bare grid and splice it into the configured host page,
    /// which replaces the main site index.
    fn write_embedded(&self, context: &tera::Context, host_page: &Path) -> Result<()> {
        let host_path = self.board.base_dir().join(host_page);
        let page = std::fs::read_to_string(&host_path)
            .wrap_err_with(|| format!("could not read the embed page: {:?}", host_path))?;

        let fragment = render(&self.board.tera, "grid.html", context)?;
        let embedded = embed_in_page(
            &page,
            &self.board.config.embed_element_selector,
            &fragment,
        )?;

        let destination = self.board.output_dir().join("index.html");
        debug!("writing embedded index: {:?}", destination);
        std::fs::write(&destination, embedded)
            .wrap_err_with(|| format!("could not write the embedded index: {:?}", destination))?;

        Ok(())
    }
}
