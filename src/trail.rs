use crate::frame::{Wheel, WheelPosition};
use nalgebra::Point2;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrailConfig {
    /// Points kept per wheel. `None` keeps the whole session.
    pub capacity: Option<usize>,
    /// Whether swapping the geometry profile wipes recorded trails.
    pub clear_on_geometry_swap: bool,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            clear_on_geometry_swap: true,
        }
    }
}

/// Recorded contact points of the four wheels, oldest first.
#[derive(Debug, Clone)]
pub struct WheelTrails {
    tracks: [VecDeque<Point2<f64>>; 4],
    capacity: Option<usize>,
}

impl WheelTrails {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            tracks: Default::default(),
            capacity,
        }
    }

    pub fn record(&mut self, wheels: &[Wheel; 4]) {
        let Self {
            ref mut tracks,
            capacity,
        } = *self;

        for wheel in wheels {
            let track = &mut tracks[wheel.position.index()];
            if let Some(capacity) = capacity {
                if capacity == 0 {
                    continue;
                }
                while track.len() >= capacity {
                    track.pop_front();
                }
            }
            track.push_back(wheel.center);
        }
    }

    pub fn get(&self, position: WheelPosition) -> &VecDeque<Point2<f64>> {
        &self.tracks[position.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (WheelPosition, &VecDeque<Point2<f64>>)> + '_ {
        WheelPosition::ALL
            .into_iter()
            .map(move |position| (position, self.get(position)))
    }

    /// Points recorded per wheel. All four tracks always have equal length.
    pub fn len(&self) -> usize {
        self.tracks[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.tracks.iter_mut().for_each(VecDeque::clear);
    }
}
