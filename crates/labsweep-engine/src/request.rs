use std::fmt;

use labsweep_core::{ErrorInfo, Measurement, SweepError, WaterfallContext};

use crate::axis::SweepAxis;

/// Hook run once before the first column is measured, or once after the
/// loops finish.
pub type Hook = Box<dyn FnOnce(&mut WaterfallContext) -> Result<(), SweepError>>;

/// Everything one run needs besides the engine configuration and backend.
///
/// `axis1` is the innermost loop and `axis3` the outermost. Slots not given
/// hold [`SweepAxis::none`].
pub struct SweepRequest {
    pub(crate) init: Option<Hook>,
    pub(crate) finalize: Option<Hook>,
    pub(crate) measure: Measurement,
    pub(crate) axes: [SweepAxis; 3],
}

impl SweepRequest {
    /// Request measuring `measure` once, with every axis slot trivial.
    pub fn new(measure: Measurement) -> Self {
        Self {
            init: None,
            finalize: None,
            measure,
            axes: [SweepAxis::none(1), SweepAxis::none(2), SweepAxis::none(3)],
        }
    }

    /// Runs `init` before the columns are assembled. It is expected to
    /// register the station.
    pub fn init<F>(mut self, init: F) -> Self
    where
        F: FnOnce(&mut WaterfallContext) -> Result<(), SweepError> + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Runs `finalize` after the loops, also when no row was produced.
    pub fn finalize<F>(mut self, finalize: F) -> Self
    where
        F: FnOnce(&mut WaterfallContext) -> Result<(), SweepError> + 'static,
    {
        self.finalize = Some(Box::new(finalize));
        self
    }

    /// Innermost axis.
    pub fn axis1(mut self, axis: SweepAxis) -> Self {
        self.axes[0] = axis;
        self
    }

    /// Middle axis.
    pub fn axis2(mut self, axis: SweepAxis) -> Self {
        self.axes[1] = axis;
        self
    }

    /// Outermost axis.
    pub fn axis3(mut self, axis: SweepAxis) -> Self {
        self.axes[2] = axis;
        self
    }

    /// Fills slots 1, 2, 3 from `axes` in order.
    ///
    /// Missing slots become trivial. Entries past the third are accepted only
    /// when trivial; anything else fails with `too-many-sweepers`.
    pub fn with_axes(mut self, axes: Vec<SweepAxis>) -> Result<Self, SweepError> {
        let mut slots = [None, None, None];
        for (idx, axis) in axes.into_iter().enumerate() {
            match slots.get_mut(idx) {
                Some(slot) => *slot = Some(axis),
                None if axis.is_trivial() => {}
                None => {
                    return Err(SweepError::Config(
                        ErrorInfo::new("too-many-sweepers", "at most three axes can be swept")
                            .with_context("axis", axis.name().to_string())
                            .with_context("position", (idx + 1).to_string()),
                    ))
                }
            }
        }
        for (idx, slot) in slots.into_iter().enumerate() {
            self.axes[idx] = slot.unwrap_or_else(|| SweepAxis::none(idx + 1));
        }
        Ok(self)
    }

    /// Axes innermost first.
    pub fn axes(&self) -> &[SweepAxis; 3] {
        &self.axes
    }

    /// Measurement run at every innermost point.
    pub fn measure(&self) -> &Measurement {
        &self.measure
    }
}

impl fmt::Debug for SweepRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepRequest")
            .field("init", &self.init.is_some())
            .field("finalize", &self.finalize.is_some())
            .field("measure", &self.measure)
            .field("axes", &self.axes)
            .finish()
    }
}
