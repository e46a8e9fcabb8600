//! Fixtures shared by unit tests.

use crate::constraints::ConstraintReader;
use crate::context::Context;
use crate::perf::ParametricPerformance;
use crate::wind::HeadwindRepository;

/// Owns the inputs of a [`Context`] built from the sample scenario.
pub(crate) struct Fixture {
    pub performance: ParametricPerformance,
    pub winds:       HeadwindRepository,
    pub params:      store::Parameters,
    pub tuning:      store::Tuning,
    pub route:       store::Route,
    pub reader:      ConstraintReader,
}

impl Fixture {
    /// The sample scenario without wind.
    pub fn calm() -> Self {
        let route = store::sample::route();
        Self {
            performance: ParametricPerformance::new(store::sample::aircraft()),
            winds: HeadwindRepository::calm(),
            params: store::sample::parameters(),
            tuning: store::Tuning::default(),
            reader: ConstraintReader::new(&route),
            route,
        }
    }

    /// The sample scenario with its forecast winds.
    pub fn windy() -> Self {
        Self { winds: HeadwindRepository::from_store(&store::sample::winds()), ..Self::calm() }
    }

    pub fn with_params(mut self, update: impl FnOnce(&mut store::Parameters)) -> Self {
        update(&mut self.params);
        self
    }

    pub fn with_tuning(mut self, update: impl FnOnce(&mut store::Tuning)) -> Self {
        update(&mut self.tuning);
        self
    }

    pub fn with_route(mut self, update: impl FnOnce(&mut store::Route)) -> Self {
        update(&mut self.route);
        self.reader = ConstraintReader::new(&self.route);
        self
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.params, &self.tuning, &self.performance, &self.winds, self.reader.lists())
    }
}
