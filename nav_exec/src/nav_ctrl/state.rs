//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{NavCtrlError, NavCtrlInitError, Params};
use comms_if::{eqpt::base::BaseDems, tc::GoalCmd};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state
pub struct NavCtrl {
    pub(crate) params: Params,

    /// The phase of the goal currently being executed.
    pub(crate) phase: Phase,

    /// Remaining displacement to the goal in the frame the robot had when the
    /// goal was accepted. This is a live register, consumed as demands are
    /// issued, not a fixed target.
    ///
    /// Units: meters
    pub(crate) goal: Vector2<f64>,

    /// When set the next cycle emits a single zero-velocity demand and steps
    /// no phase, actively cancelling any in-flight motion.
    stop_pending: bool,

    /// The goal accepted this cycle, if any, kept for the goal archive.
    accepted_goal: Option<GoalCmd>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: OutputData,
    arch_output: Archiver,

    arch_goals: Archiver,
}

/// Input data to Navigation Control.
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// The goal command to start executing, or `None` if there is no new goal
    /// on this cycle.
    pub goal_cmd: Option<GoalCmd>,

    /// OR of the `bumps_wheeldrops` bitfields recieved from the base this
    /// cycle. Nonzero abandons the current goal.
    pub bumps_wheeldrops: u8,
}

/// Output of one NavCtrl cycle.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct OutputData {
    /// The velocity demand to send to the base this cycle, or `None` if no
    /// demand is to be sent.
    pub base_dems: Option<BaseDems>,

    /// Settle pause to schedule after the demand, a scheduling directive for
    /// the executive, never a blocking call.
    ///
    /// Units: seconds
    pub settle_duration_s: Option<f64>,
}

/// Status report for NavCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Phase at the end of the cycle.
    pub phase: Phase,

    /// Remaining forward distance to cover.
    pub remaining_x_m: f64,

    /// Remaining lateral distance to cover.
    pub remaining_y_m: f64,

    /// True while a goal is being executed.
    pub busy: bool,

    /// A goal was accepted this cycle.
    pub goal_accepted: bool,

    /// A goal arrived while busy and was dropped this cycle.
    pub goal_rejected: bool,

    /// The goal register reached zero this cycle.
    pub goal_complete: bool,

    /// A collision abandoned the goal this cycle.
    pub collision_reset: bool,
}

/// Flattened form of [`OutputData`] for the csv archive.
#[derive(Serialize)]
struct OutputRecord {
    linear_ms: Option<f64>,
    angular_rads: Option<f64>,
    settle_duration_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phase of goal execution.
///
/// The phase is the single source of truth for whether the controller is
/// busy, so the busy flag can never disagree with the remaining-distance
/// register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No goal is being executed, new goals are accepted.
    Idle,

    /// First cycle of a turn-then-forward goal, rotating onto the goal
    /// heading.
    RotatingToHeading,

    /// Consuming the forward component of the goal in fixed increments.
    MovingForward,

    /// Quarter turn converting a purely lateral remaining goal into a
    /// forward one.
    SwappingAxes,

    /// Both components reached zero, completion returns the phase to Idle.
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for NavCtrl {
    type InitData = &'static str;
    type InitError = NavCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data)?;

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "nav_ctrl/status_report.csv")?;
        self.arch_output = Archiver::from_path(session, "nav_ctrl/output.csv")?;
        self.arch_goals = Archiver::from_path(session, "nav_ctrl/goals.csv")?;

        Ok(())
    }

    /// Perform cyclic processing of Navigation Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report and the previous cycle's output
        self.report = StatusReport::default();
        self.output = OutputData::default();
        self.accepted_goal = None;

        // Apply any new goal. Rejection is reported, not fatal, the cycle
        // carries on stepping the goal already in progress.
        if let Some(ref cmd) = input_data.goal_cmd {
            match self.set_goal(cmd) {
                Ok(()) => {
                    self.report.goal_accepted = true;
                    self.accepted_goal = Some(*cmd);
                }
                Err(NavCtrlError::GoalInProgress) => {
                    warn!(
                        "Goal ({:.3}, {:.3}) m rejected, movement still in progress",
                        cmd.x_m, cmd.y_m
                    );
                    self.report.goal_rejected = true;
                }
            }
        }

        // Apply the cycle's collision bits. A collision always wins, even
        // over a goal accepted earlier in the same cycle.
        self.on_collision(input_data.bumps_wheeldrops);

        if self.stop_pending {
            // The stop is the only demand this cycle, stepping resumes on the
            // next one
            self.stop_pending = false;
            self.output.base_dems = Some(BaseDems::stop());
        } else {
            match self.phase {
                Phase::Idle => (),
                Phase::RotatingToHeading => self.rotate_to_heading(),
                Phase::MovingForward => self.translate(),
                Phase::SwappingAxes => self.swap_axes(),
                Phase::Done => (),
            }

            // A step which zeroes the register leaves the phase in Done,
            // completion collapses it back to Idle within the same cycle
            if self.phase == Phase::Done {
                self.complete();
            }
        }

        // Fill the report
        self.report.phase = self.phase;
        self.report.remaining_x_m = self.goal.x;
        self.report.remaining_y_m = self.goal.y;
        self.report.busy = self.busy();

        if let Some(ref dems) = self.output.base_dems {
            trace!(
                "NavCtrl dems: linear {:.3} m/s, angular {:.3} rad/s",
                dems.linear_ms,
                dems.angular_rads
            );
        }

        Ok((self.output, self.report))
    }

    /// Abandons the current goal and arms a stop demand.
    fn make_safe(&mut self) {
        if self.busy() {
            warn!(
                "Make safe with ({:.3}, {:.3}) m remaining, goal abandoned",
                self.goal.x, self.goal.y
            );
        }

        self.goal = Vector2::zeros();
        self.phase = Phase::Idle;
        self.stop_pending = true;
    }
}

impl Archived for NavCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(OutputRecord::from(&self.output))?;

        // The goal archive only gets a row on the cycles a goal is accepted
        if let Some(cmd) = self.accepted_goal {
            self.arch_goals.serialise(cmd)?;
        }

        Ok(())
    }
}

impl NavCtrl {
    /// Create a NavCtrl with the given parameters and no archiving.
    ///
    /// Used where there is no session to archive into, such as benchmarks.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// True while a goal is being executed.
    pub fn busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Load a new goal into the controller.
    ///
    /// While a goal is in progress new goals are rejected with
    /// [`NavCtrlError::GoalInProgress`] and the state is left untouched. No
    /// bounds validation is performed on the magnitudes, arbitrarily large or
    /// non-finite values are accepted and propagate.
    pub fn set_goal(&mut self, cmd: &GoalCmd) -> Result<(), NavCtrlError> {
        if self.busy() {
            return Err(NavCtrlError::GoalInProgress);
        }

        self.goal = Vector2::new(cmd.x_m, cmd.y_m);

        // Entry phase, first matching rule wins. A purely lateral goal is
        // handled by the quarter-turn axis swap, never by the atan rotation,
        // which also keeps the atan argument finite.
        self.phase = if self.params.turn_then_forward && cmd.x_m != 0.0 && cmd.y_m != 0.0 {
            Phase::RotatingToHeading
        } else if cmd.x_m != 0.0 {
            Phase::MovingForward
        } else if cmd.y_m != 0.0 {
            Phase::SwappingAxes
        } else {
            Phase::Done
        };

        info!(
            "New goal accepted: ({:.3}, {:.3}) m, starting in {:?}",
            cmd.x_m, cmd.y_m, self.phase
        );

        Ok(())
    }

    /// Handle a collision signalled by the base.
    ///
    /// A nonzero bitfield unconditionally abandons the current goal,
    /// whatever the phase: the register is zeroed, the phase returns to Idle
    /// and a one-shot stop demand is armed for the next cycle. Remaining
    /// progress is discarded, the robot does not resume after a collision. A
    /// zero bitfield has no effect.
    ///
    /// Safe to invoke between any two cycles, the executive also routes the
    /// bump bits of every recieved sensor frame here through the input data.
    pub fn on_collision(&mut self, bumps_wheeldrops: u8) {
        if bumps_wheeldrops == 0 {
            return;
        }

        if self.busy() {
            warn!(
                "Collision (bumps_wheeldrops = {:#010b}), abandoning goal with \
                ({:.3}, {:.3}) m remaining",
                bumps_wheeldrops, self.goal.x, self.goal.y
            );
        } else {
            warn!(
                "Collision (bumps_wheeldrops = {:#010b}) while idle",
                bumps_wheeldrops
            );
        }

        self.goal = Vector2::zeros();
        self.phase = Phase::Idle;
        self.stop_pending = true;
        self.report.collision_reset = true;
    }

    /// Complete the current goal, returning the controller to idle.
    fn complete(&mut self) {
        self.phase = Phase::Idle;
        self.goal = Vector2::zeros();
        self.report.goal_complete = true;

        info!("Goal complete");
    }
}

impl Default for NavCtrl {
    fn default() -> Self {
        Self {
            params: Params::default(),
            phase: Phase::Idle,
            goal: Vector2::zeros(),
            stop_pending: false,
            accepted_goal: None,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: OutputData::default(),
            arch_output: Archiver::default(),
            arch_goals: Archiver::default(),
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl From<&OutputData> for OutputRecord {
    fn from(output: &OutputData) -> Self {
        Self {
            linear_ms: output.base_dems.map(|d| d.linear_ms),
            angular_rads: output.base_dems.map(|d| d.angular_rads),
            settle_duration_s: output.settle_duration_s,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            increment_m: 0.3,
            fwd_speed_ms: 0.306,
            quarter_turn_rate_rads: 1.0,
            translate_settle_s: 0.5,
            rotate_settle_s: 0.7,
            turn_then_forward: true,
        }
    }

    fn goal_input(x_m: f64, y_m: f64) -> InputData {
        InputData {
            goal_cmd: Some(GoalCmd { x_m, y_m }),
            bumps_wheeldrops: 0,
        }
    }

    #[test]
    fn test_exact_increments() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // 0.9 m forward with a 0.3 m increment is exactly three full-speed
        // steps, the last one zeroing the register
        let mut input = goal_input(0.9, 0.0);

        for i in 0..3 {
            let (output, report) = nav_ctrl.proc(&input).unwrap();

            let dems = output.base_dems.unwrap();
            assert!((dems.linear_ms - 0.306).abs() < 1e-12, "cycle {}", i);
            assert_eq!(dems.angular_rads, 0.0, "cycle {}", i);
            assert_eq!(output.settle_duration_s, Some(0.5), "cycle {}", i);

            // Busy turns false exactly on the cycle that zeroes the register
            if i < 2 {
                assert!(report.busy, "cycle {}", i);
                assert!(
                    (report.remaining_x_m - 0.3 * (2 - i) as f64).abs() < 1e-9,
                    "cycle {}",
                    i
                );
            } else {
                assert!(!report.busy);
                assert!(report.goal_complete);
                assert_eq!(report.remaining_x_m, 0.0);
            }

            input = InputData::default();
        }

        // Idle cycles emit nothing
        let (output, report) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(output.base_dems.is_none());
        assert!(!report.busy);
    }

    #[test]
    fn test_turn_then_forward() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // First cycle rotates onto the goal heading, atan(2/2) is an eighth
        // turn to the left
        let (output, report) = nav_ctrl.proc(&goal_input(2.0, 2.0)).unwrap();

        let dems = output.base_dems.unwrap();
        assert_eq!(dems.linear_ms, 0.0);
        assert!((dems.angular_rads - 0.5).abs() < 1e-12);
        assert_eq!(output.settle_duration_s, Some(0.7));

        // The goal collapses to the straight-line distance along the new
        // heading
        assert_eq!(report.phase, Phase::MovingForward);
        assert!((report.remaining_x_m - 8f64.sqrt()).abs() < 1e-12);
        assert_eq!(report.remaining_y_m, 0.0);

        // Second cycle is the first forward step
        let (output, _) = nav_ctrl.proc(&InputData::default()).unwrap();
        let dems = output.base_dems.unwrap();
        assert!((dems.linear_ms - 0.306).abs() < 1e-12);
        assert_eq!(dems.angular_rads, 0.0);
        assert_eq!(output.settle_duration_s, Some(0.5));
    }

    #[test]
    fn test_axis_swap_left() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // A purely lateral goal starts with a full left quarter turn, never
        // with the atan rotation
        let (output, report) = nav_ctrl.proc(&goal_input(0.0, 5.0)).unwrap();

        let dems = output.base_dems.unwrap();
        assert_eq!(dems.linear_ms, 0.0);
        assert_eq!(dems.angular_rads, 1.0);
        assert_eq!(report.phase, Phase::MovingForward);
        assert_eq!(report.remaining_x_m, 5.0);
        assert_eq!(report.remaining_y_m, 0.0);
    }

    #[test]
    fn test_lateral_goal_right() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // One right quarter turn, the lateral distance swaps into the
        // forward register
        let (output, report) = nav_ctrl.proc(&goal_input(0.0, -4.0)).unwrap();

        let dems = output.base_dems.unwrap();
        assert_eq!(dems.angular_rads, -1.0);
        assert_eq!(report.remaining_x_m, 4.0);
        assert_eq!(report.remaining_y_m, 0.0);

        // 4.0 m of forward distance is 13 full steps and one partial step
        let mut cycles = 0;
        loop {
            let (output, report) = nav_ctrl.proc(&InputData::default()).unwrap();
            assert!(output.base_dems.unwrap().linear_ms > 0.0);
            cycles += 1;

            if !report.busy {
                assert!(report.goal_complete);
                break;
            }

            assert!(cycles < 100, "goal did not complete");
        }

        assert_eq!(cycles, 14);
    }

    #[test]
    fn test_goal_rejected_while_busy() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        let (_, report) = nav_ctrl.proc(&goal_input(0.9, 0.0)).unwrap();
        assert!(report.goal_accepted);

        // A second goal while busy is dropped and the original remaining
        // values are untouched
        let (_, report) = nav_ctrl.proc(&goal_input(5.0, 5.0)).unwrap();
        assert!(report.goal_rejected);
        assert!(!report.goal_accepted);
        assert!((report.remaining_x_m - 0.3).abs() < 1e-9);
        assert_eq!(report.remaining_y_m, 0.0);

        // The original goal still runs to completion
        let (_, report) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(!report.busy);
        assert!(report.goal_complete);
    }

    #[test]
    fn test_set_goal_while_busy_errors() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        nav_ctrl.set_goal(&GoalCmd { x_m: 1.0, y_m: 1.0 }).unwrap();
        assert!(nav_ctrl.busy());

        let result = nav_ctrl.set_goal(&GoalCmd { x_m: 2.0, y_m: 0.0 });
        assert!(matches!(result, Err(NavCtrlError::GoalInProgress)));
        assert_eq!(nav_ctrl.goal, Vector2::new(1.0, 1.0));
    }

    #[test]
    fn test_collision_resets_all_phases() {
        // A collision in any phase immediately zeroes the register and idles
        // the controller
        for &(x_m, y_m) in &[(2.0, 2.0), (0.9, 0.0), (0.0, -4.0)] {
            let mut nav_ctrl = NavCtrl::with_params(test_params());

            nav_ctrl.set_goal(&GoalCmd { x_m, y_m }).unwrap();
            nav_ctrl.on_collision(0x01);

            assert!(!nav_ctrl.busy(), "goal ({}, {})", x_m, y_m);
            assert_eq!(nav_ctrl.goal, Vector2::zeros(), "goal ({}, {})", x_m, y_m);
        }
    }

    #[test]
    fn test_collision_mid_goal() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        nav_ctrl.proc(&goal_input(0.9, 0.0)).unwrap();

        // A bump while moving abandons the goal, the cycle emits only the
        // stop demand
        let input = InputData {
            goal_cmd: None,
            bumps_wheeldrops: 0x02,
        };
        let (output, report) = nav_ctrl.proc(&input).unwrap();

        assert!(report.collision_reset);
        assert!(!report.busy);
        assert_eq!(report.remaining_x_m, 0.0);

        let dems = output.base_dems.unwrap();
        assert_eq!(dems.linear_ms, 0.0);
        assert_eq!(dems.angular_rads, 0.0);
        assert!(output.settle_duration_s.is_none());

        // The next cycle is quiet
        let (output, _) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(output.base_dems.is_none());
    }

    #[test]
    fn test_collision_wins_over_new_goal() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // Goal and bump arrive in the same cycle, the collision wins and the
        // only demand ever emitted for this goal is the one-shot stop
        let input = InputData {
            goal_cmd: Some(GoalCmd { x_m: 1.0, y_m: 1.0 }),
            bumps_wheeldrops: 0x01,
        };
        let (output, report) = nav_ctrl.proc(&input).unwrap();

        assert!(report.goal_accepted);
        assert!(report.collision_reset);
        assert!(!report.busy);

        let dems = output.base_dems.unwrap();
        assert_eq!(dems.linear_ms, 0.0);
        assert_eq!(dems.angular_rads, 0.0);

        // No motion demand on any later cycle
        for _ in 0..3 {
            let (output, _) = nav_ctrl.proc(&InputData::default()).unwrap();
            assert!(output.base_dems.is_none());
        }
    }

    #[test]
    fn test_collision_before_first_cycle() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        nav_ctrl.set_goal(&GoalCmd { x_m: 1.0, y_m: 1.0 }).unwrap();
        nav_ctrl.on_collision(0x01);

        assert!(!nav_ctrl.busy());

        // The first cycle after the collision emits the one-shot stop
        let (output, _) = nav_ctrl.proc(&InputData::default()).unwrap();
        let dems = output.base_dems.unwrap();
        assert_eq!(dems.linear_ms, 0.0);
        assert_eq!(dems.angular_rads, 0.0);

        // Nothing after that
        let (output, _) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(output.base_dems.is_none());
    }

    #[test]
    fn test_monotonic_progress() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        let (_, report) = nav_ctrl.proc(&goal_input(1.0, 0.0)).unwrap();
        let mut last_x = report.remaining_x_m;

        // Each forward cycle reduces the register by exactly one increment,
        // or by the whole remainder on the final step
        let mut cycles = 0;
        while nav_ctrl.busy() {
            let (_, report) = nav_ctrl.proc(&InputData::default()).unwrap();

            let step = last_x - report.remaining_x_m;
            let expected = last_x.min(0.3);
            assert!((step - expected).abs() < 1e-9, "cycle {}", cycles);

            last_x = report.remaining_x_m;

            cycles += 1;
            assert!(cycles < 10, "goal did not complete");
        }
    }

    #[test]
    fn test_zero_goal_completes_immediately() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // A (0, 0) goal is accepted and completes without any demand
        let (output, report) = nav_ctrl.proc(&goal_input(0.0, 0.0)).unwrap();

        assert!(report.goal_accepted);
        assert!(report.goal_complete);
        assert!(!report.busy);
        assert!(output.base_dems.is_none());
    }

    #[test]
    fn test_forward_first_mode() {
        let mut params = test_params();
        params.turn_then_forward = false;

        let mut nav_ctrl = NavCtrl::with_params(params);

        // Forward first, no initial rotation
        let (output, report) = nav_ctrl.proc(&goal_input(0.3, 0.3)).unwrap();
        let dems = output.base_dems.unwrap();
        assert!(dems.linear_ms > 0.0);
        assert_eq!(dems.angular_rads, 0.0);
        assert_eq!(report.phase, Phase::SwappingAxes);

        // Then the lateral component swaps in through a quarter turn
        let (output, report) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(output.base_dems.unwrap().angular_rads, 1.0);
        assert_eq!(report.phase, Phase::MovingForward);
        assert!((report.remaining_x_m - 0.3).abs() < 1e-12);

        // And is driven out
        let (_, report) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(!report.busy);
        assert!(report.goal_complete);
    }

    #[test]
    fn test_backward_goal() {
        let mut nav_ctrl = NavCtrl::with_params(test_params());

        // Negative forward distance drives backwards
        let (output, report) = nav_ctrl.proc(&goal_input(-0.9, 0.0)).unwrap();
        let dems = output.base_dems.unwrap();
        assert!((dems.linear_ms + 0.306).abs() < 1e-12);
        assert!(report.busy);
        assert!((report.remaining_x_m + 0.6).abs() < 1e-9);

        nav_ctrl.proc(&InputData::default()).unwrap();

        // The final partial step keeps the sign
        let (output, report) = nav_ctrl.proc(&InputData::default()).unwrap();
        assert!(output.base_dems.unwrap().linear_ms < 0.0);
        assert!(!report.busy);
    }
}
