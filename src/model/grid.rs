use chrono::{NaiveTime, Timelike};

use crate::configuration::config::Config;

/// Pixel geometry of the hour-slot grid in each day column.
///
/// A day column is a header followed by `slot_count` fixed-height hour slots
/// starting at `day_start_hour`. Event blocks are placed at one pixel per
/// minute relative to the top of the column (header included), with a small
/// inset so adjacent blocks do not touch.
///
/// Offsets are signed on purpose: times before the first hour or past the
/// last slot yield negative or overflowing positions rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    day_start_hour: u32,
    slot_count: u32,
    slot_height: u32,
    header_height: u32,
    block_inset: u32,
}

/// The resolved placement of one event block inside its day column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub top: i64,
    pub height: i64,
}

impl SlotGrid {
    pub fn new(
        day_start_hour: u32,
        slot_count: u32,
        slot_height: u32,
        header_height: u32,
        block_inset: u32,
    ) -> SlotGrid {
        SlotGrid {
            day_start_hour,
            slot_count,
            slot_height,
            header_height,
            block_inset,
        }
    }

    pub fn from_config(config: &Config) -> SlotGrid {
        SlotGrid::new(
            config.day_start_hour,
            config.day_slot_count,
            config.slot_height,
            config.day_header_height,
            config.block_inset,
        )
    }

    /// Minutes between the start of the grid and the given time of day
    pub fn minutes_from_day_start(&self, time: NaiveTime) -> i64 {
        (i64::from(time.hour()) - i64::from(self.day_start_hour)) * 60 + i64::from(time.minute())
    }

    fn pixels_from_column_top(&self, time: NaiveTime) -> i64 {
        // one pixel per minute, scaled by the configured slot height
        self.header_height as i64
            + self.minutes_from_day_start(time) * i64::from(self.slot_height) / 60
    }

    /// Where an event running from `start` to `end` lands in its day column
    pub fn block(&self, start: NaiveTime, end: NaiveTime) -> Block {
        let inset = i64::from(self.block_inset);
        let top = self.pixels_from_column_top(start) + inset;
        let bottom = self.pixels_from_column_top(end) - inset;

        Block {
            top,
            height: bottom - top - inset,
        }
    }

    /// The labels of the hour slots, first to last
    pub fn hour_labels(&self) -> Vec<String> {
        (self.day_start_hour..self.day_start_hour + self.slot_count)
            .map(|hour| format!("{:02}:00", hour))
            .collect()
    }

    pub fn slot_height(&self) -> u32 {
        self.slot_height
    }

    pub fn header_height(&self) -> u32 {
        self.header_height
    }

    /// Full pixel height of a day column, header included
    pub fn column_height(&self) -> u32 {
        self.header_height + self.slot_count * self.slot_height
    }
}
