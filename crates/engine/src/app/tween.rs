//! Keyed property interpolation.
//!
//! A tween animates one `f32` channel of one group (typically a prop id)
//! from a snapshot value to a target value over a duration. Completion is
//! not a callback: finished tweens are reported exactly once through a
//! queue the caller drains after each update pass, which keeps the update
//! loop single-threaded and non-reentrant.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    BounceOut,
    ElasticOut,
}

const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;
const ELASTIC_C4: f32 = 2.0 * std::f32::consts::PI / 3.0;

impl Easing {
    /// Maps normalized time in [0, 1] to eased progress. `apply(0) == 0`
    /// and `apply(1) == 1` for every curve; bounce and elastic may
    /// overshoot slightly above 1 in between.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::BounceOut => {
                if t < 1.0 / BOUNCE_D1 {
                    BOUNCE_N1 * t * t
                } else if t < 2.0 / BOUNCE_D1 {
                    let t = t - 1.5 / BOUNCE_D1;
                    BOUNCE_N1 * t * t + 0.75
                } else if t < 2.5 / BOUNCE_D1 {
                    let t = t - 2.25 / BOUNCE_D1;
                    BOUNCE_N1 * t * t + 0.9375
                } else {
                    let t = t - 2.625 / BOUNCE_D1;
                    BOUNCE_N1 * t * t + 0.984375
                }
            }
            Easing::ElasticOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2.0f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenCompleted<G> {
    pub group: G,
    pub channel: u16,
    /// Final value of the channel; the caller applies it on completion.
    pub value: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween<G> {
    group: G,
    channel: u16,
    from: f32,
    to: f32,
    duration_seconds: f32,
    elapsed_seconds: f32,
    easing: Easing,
    done: bool,
}

impl<G> ActiveTween<G> {
    fn current_value(&self) -> f32 {
        let t = (self.elapsed_seconds / self.duration_seconds).min(1.0);
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

/// Active tween set. One update pass runs per frame; tweens started after
/// the pass began are first advanced on the following frame.
#[derive(Debug)]
pub struct TweenSet<G: Copy + PartialEq> {
    active: Vec<ActiveTween<G>>,
    completed: Vec<TweenCompleted<G>>,
}

impl<G: Copy + PartialEq> Default for TweenSet<G> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            completed: Vec::new(),
        }
    }
}

impl<G: Copy + PartialEq> TweenSet<G> {
    /// Starts (or restarts) the tween for `(group, channel)`. An existing
    /// tween on the same key is replaced without a completion event.
    pub fn start(
        &mut self,
        group: G,
        channel: u16,
        from: f32,
        to: f32,
        duration_seconds: f32,
        easing: Easing,
    ) {
        self.active
            .retain(|tween| !(tween.group == group && tween.channel == channel));
        self.active.push(ActiveTween {
            group,
            channel,
            from,
            to,
            duration_seconds: duration_seconds.max(f32::EPSILON),
            elapsed_seconds: 0.0,
            easing,
            done: false,
        });
    }

    /// Advances every tween that was active when the pass started.
    pub fn update(&mut self, dt_seconds: f32) {
        let present_at_entry = self.active.len();
        for tween in self.active.iter_mut().take(present_at_entry) {
            tween.elapsed_seconds += dt_seconds;
            if tween.elapsed_seconds >= tween.duration_seconds {
                tween.done = true;
                self.completed.push(TweenCompleted {
                    group: tween.group,
                    channel: tween.channel,
                    value: tween.to,
                });
            }
        }
        self.active.retain(|tween| !tween.done);
    }

    /// Completions since the last drain, each reported exactly once.
    pub fn drain_completed(&mut self) -> Vec<TweenCompleted<G>> {
        std::mem::take(&mut self.completed)
    }

    /// Removes every tween for `group` without completion events.
    pub fn cancel_group(&mut self, group: G) {
        self.active.retain(|tween| tween.group != group);
    }

    pub fn has_group(&self, group: G) -> bool {
        self.active.iter().any(|tween| tween.group == group)
    }

    /// Current interpolated value, or `None` once the tween finished or
    /// was cancelled.
    pub fn value(&self, group: G, channel: u16) -> Option<f32> {
        self.active
            .iter()
            .find(|tween| tween.group == group && tween.channel == channel)
            .map(ActiveTween::current_value)
    }

    /// Current `(group, channel, value)` of every running tween, in start
    /// order. The caller applies these to its own state each frame.
    pub fn active_values(&self) -> impl Iterator<Item = (G, u16, f32)> + '_ {
        self.active
            .iter()
            .map(|tween| (tween.group, tween.channel, tween.current_value()))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
