//! Keyed tween scheduling.
//!
//! A [`TweenEngine`] holds at most one tween per key. Starting a tween on a key that
//! is already animating replaces the old tween without firing its completion
//! event, so the last writer always wins. Values are read from and written to an
//! [`Animatable`] target on every [`TweenEngine::tick`].

use std::fmt::Debug;

use glam::Vec3;

use crate::ease::Ease;

/// Values that can be interpolated.
pub trait Lerp: Copy {
    /// Interpolates between `self` (at 0) and `to` (at 1).
    #[must_use]
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec3::lerp(self, to, t)
    }
}

/// Timing of a single tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    /// Seconds from start to end. Zero completes on the first tick after the delay.
    pub duration: f32,
    /// Seconds to wait before the start value is captured.
    pub delay: f32,
    /// Easing curve.
    pub ease: Ease,
}

impl TweenSpec {
    /// Creates a spec without delay.
    #[must_use]
    pub fn new(duration: f32, ease: Ease) -> Self {
        Self {
            duration,
            delay: 0.0,
            ease,
        }
    }

    /// Sets the start delay.
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// Storage that tweens read start values from and write progress into.
pub trait Animatable<K, V> {
    /// Returns the current value, or `None` if the key no longer exists.
    fn read(&self, key: &K) -> Option<V>;

    /// Writes an interpolated value.
    fn write(&mut self, key: &K, value: V);
}

/// Identifier of a started tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Debug)]
struct Tween<K, V, E> {
    id: TweenId,
    key: K,
    from: Option<V>,
    to: V,
    spec: TweenSpec,
    elapsed: f32,
    on_complete: Option<E>,
}

/// Schedules tweens keyed by `K` over values `V`, reporting completions as `E`.
#[derive(Debug)]
pub struct TweenEngine<K, V, E> {
    tweens: Vec<Tween<K, V, E>>,
    next_id: u64,
}

impl<K, V, E> Default for TweenEngine<K, V, E> {
    fn default() -> Self {
        Self {
            tweens: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K, V, E> TweenEngine<K, V, E>
where
    K: PartialEq + Debug,
    V: Lerp,
{
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tweens `key` from its value at start time toward `to`.
    ///
    /// Replaces any tween already running on `key`. `on_complete` is returned from
    /// the [`tick`](Self::tick) in which the tween reaches its end.
    pub fn to(&mut self, key: K, to: V, spec: TweenSpec, on_complete: Option<E>) -> TweenId {
        self.start(key, None, to, spec, on_complete)
    }

    /// Tweens `key` from an explicit start value toward `to`.
    pub fn from_to(
        &mut self,
        key: K,
        from: V,
        to: V,
        spec: TweenSpec,
        on_complete: Option<E>,
    ) -> TweenId {
        self.start(key, Some(from), to, spec, on_complete)
    }

    fn start(
        &mut self,
        key: K,
        from: Option<V>,
        to: V,
        spec: TweenSpec,
        on_complete: Option<E>,
    ) -> TweenId {
        if self.kill(&key) {
            log::debug!("tween on {key:?} overridden");
        }

        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(Tween {
            id,
            key,
            from,
            to,
            spec,
            elapsed: 0.0,
            on_complete,
        });
        id
    }

    /// Stops the tween on `key` without firing its completion.
    ///
    /// Returns true if a tween was running.
    pub fn kill(&mut self, key: &K) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.key != *key);
        self.tweens.len() != before
    }

    /// Returns true if a tween is scheduled on `key`.
    #[must_use]
    pub fn is_animating(&self, key: &K) -> bool {
        self.tweens.iter().any(|t| t.key == *key)
    }

    /// Returns the id of the tween scheduled on `key`.
    #[must_use]
    pub fn active_id(&self, key: &K) -> Option<TweenId> {
        self.tweens.iter().find(|t| t.key == *key).map(|t| t.id)
    }

    /// Returns the end value of the tween scheduled on `key`.
    #[must_use]
    pub fn target_value(&self, key: &K) -> Option<V> {
        self.tweens.iter().find(|t| t.key == *key).map(|t| t.to)
    }

    /// Returns the number of scheduled tweens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Returns true if no tween is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advances every tween by `dt` seconds and writes the new values.
    ///
    /// Returns the completion events of tweens that finished during this tick, in
    /// the order the tweens were started.
    pub fn tick<T>(&mut self, dt: f32, target: &mut T) -> Vec<E>
    where
        T: Animatable<K, V> + ?Sized,
    {
        let mut completed = Vec::new();

        self.tweens.retain_mut(|tween| {
            tween.elapsed += dt;
            if tween.elapsed < tween.spec.delay {
                return true;
            }

            let from = match tween.from {
                Some(from) => from,
                None => match target.read(&tween.key) {
                    Some(current) => {
                        tween.from = Some(current);
                        current
                    }
                    None => {
                        log::warn!("dropping tween on {:?}: target is gone", tween.key);
                        return false;
                    }
                },
            };

            let local = tween.elapsed - tween.spec.delay;
            let progress = if tween.spec.duration > 0.0 {
                (local / tween.spec.duration).min(1.0)
            } else {
                1.0
            };

            if progress < 1.0 {
                target.write(&tween.key, from.lerp(tween.to, tween.spec.ease.apply(progress)));
                return true;
            }

            target.write(&tween.key, tween.to);
            log::trace!("tween on {:?} complete", tween.key);
            if let Some(event) = tween.on_complete.take() {
                completed.push(event);
            }
            false
        });

        completed
    }

    /// Jumps every scheduled tween to its end value.
    ///
    /// Returns all completion events, in the order the tweens were started.
    pub fn finish_all<T>(&mut self, target: &mut T) -> Vec<E>
    where
        T: Animatable<K, V> + ?Sized,
    {
        self.tweens
            .drain(..)
            .filter_map(|mut tween| {
                target.write(&tween.key, tween.to);
                tween.on_complete.take()
            })
            .collect()
    }
}
