use crate::shared::point::Point;
use crate::state::alert_flag::{alert_flag, AlertReader, AlertWriter};
use crate::state::published_position::{position_cell, PositionReader, PositionWriter};
use crate::state::running_flag::RunningFlag;

/// Everything the detection thread and the actuator loops share.
///
/// Built once per session and taken apart by the executor: the writer ends
/// go to the detection path, the reader ends and the run flag to the loops.
/// Nothing here is global; it is dropped after all loops are joined.
pub struct SharedState {
    pub position: PositionWriter,
    pub position_reader: PositionReader,
    pub alert: AlertWriter,
    pub alert_reader: AlertReader,
    pub running: RunningFlag,
}

impl SharedState {
    pub fn new(initial_position: Point, running: RunningFlag) -> Self {
        let (position, position_reader) = position_cell(initial_position);
        let (alert, alert_reader) = alert_flag();
        Self {
            position,
            position_reader,
            alert,
            alert_reader,
            running,
        }
    }
}
