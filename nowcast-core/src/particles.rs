//! Decorative rain/cloud particle layer.
//!
//! [`ParticleField`] is plain state advanced one frame at a time, so tests
//! can run an exact number of frames. [`Animator`] drives it from a tokio
//! task that runs until stopped.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::icon::WeatherCategory;

pub const DEFAULT_PARTICLES: usize = 120;
const RAIN_STREAK: f64 = 14.0;
const RAIN_SPEED: f64 = 4.0;
const CLOUD_RADIUS: f64 = 6.0;
const CLOUD_SPEED: f64 = 0.3;

/// Drawing target of the particle layer.
pub trait Canvas {
    fn clear(&mut self);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64));
    fn fill_circle(&mut self, center: (f64, f64), radius: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub size: f64,
}

/// A recorded drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Line { from: (f64, f64), to: (f64, f64) },
    Circle { center: (f64, f64), radius: f64 },
}

/// Canvas that keeps the shapes of the last frame for later painting.
#[derive(Debug, Default, Clone)]
pub struct ShapeBuffer {
    pub shapes: Vec<Shape>,
}

impl Canvas for ShapeBuffer {
    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.shapes.push(Shape::Line { from, to });
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64) {
        self.shapes.push(Shape::Circle { center, radius });
    }
}

#[derive(Debug)]
pub struct ParticleField {
    category: WeatherCategory,
    particles: Vec<Particle>,
    count: usize,
    width: f64,
    height: f64,
    rng: StdRng,
}

pub type SharedField = Arc<Mutex<ParticleField>>;

impl ParticleField {
    pub fn new(count: usize, width: f64, height: f64) -> Self {
        Self::with_rng(count, width, height, StdRng::from_entropy())
    }

    /// Deterministic field for reproducible frames.
    pub fn seeded(count: usize, width: f64, height: f64, seed: u64) -> Self {
        Self::with_rng(count, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, width: f64, height: f64, rng: StdRng) -> Self {
        Self {
            category: WeatherCategory::Sunny,
            particles: Vec::new(),
            count,
            width: width.max(0.0),
            height: height.max(0.0),
            rng,
        }
    }

    pub fn shared(self) -> SharedField {
        Arc::new(Mutex::new(self))
    }

    pub fn category(&self) -> WeatherCategory {
        self.category
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Switch the animation mode. A change of category regenerates every
    /// particle; setting the current category again is a no-op.
    pub fn set_category(&mut self, category: WeatherCategory) {
        if category == self.category && !self.particles.is_empty() {
            return;
        }
        self.category = category;
        self.regenerate();
    }

    /// Resync to the viewport size. Particles keep their positions and wrap
    /// on their next move.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn regenerate(&mut self) {
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.particles = (0..self.count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..1.0) * w,
                y: rng.gen_range(0.0..1.0) * h,
                speed: rng.gen_range(1.0..3.0),
                size: rng.gen_range(1.0..3.0),
            })
            .collect();
    }

    /// Draw the current positions onto `canvas`.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear();
        match self.category {
            WeatherCategory::Rain => {
                for p in &self.particles {
                    canvas.stroke_line((p.x, p.y), (p.x, p.y + RAIN_STREAK));
                }
            }
            WeatherCategory::Cloudy => {
                for p in &self.particles {
                    canvas.fill_circle((p.x, p.y), p.size * CLOUD_RADIUS);
                }
            }
            WeatherCategory::Sunny => {}
        }
    }

    /// Move every particle one frame: rain falls and wraps to the top,
    /// clouds drift right and wrap to the left edge.
    pub fn advance(&mut self) {
        match self.category {
            WeatherCategory::Rain => {
                for p in &mut self.particles {
                    p.y += p.speed * RAIN_SPEED;
                    if p.y > self.height {
                        p.y = 0.0;
                    }
                }
            }
            WeatherCategory::Cloudy => {
                for p in &mut self.particles {
                    p.x += p.speed * CLOUD_SPEED;
                    if p.x > self.width {
                        p.x = 0.0;
                    }
                }
            }
            WeatherCategory::Sunny => {}
        }
    }

    /// One full frame: draw, then move.
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        self.draw(canvas);
        self.advance();
    }

    pub fn run_frames<C: Canvas + ?Sized>(&mut self, canvas: &mut C, frames: usize) {
        for _ in 0..frames {
            self.frame(canvas);
        }
    }
}

/// Background task advancing a shared field at a fixed frame rate.
#[derive(Debug)]
pub struct Animator {
    token: CancellationToken,
    handle: JoinHandle<u64>,
}

impl Animator {
    /// Spawn the frame loop on the current tokio runtime.
    pub fn start(field: SharedField, frame: Duration) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut frames = 0u64;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        field.lock().advance();
                        frames += 1;
                    }
                }
            }
            tracing::debug!("Animator stopped after {frames} frames");
            frames
        });

        Self { token, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the loop and wait for it. Returns the number of frames run.
    pub async fn stop(self) -> u64 {
        self.token.cancel();
        self.handle.await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rain_field() -> ParticleField {
        let mut field = ParticleField::seeded(DEFAULT_PARTICLES, 800.0, 600.0, 7);
        field.set_category(WeatherCategory::Rain);
        field
    }

    #[test]
    fn regenerates_full_set_within_bounds() {
        let field = rain_field();
        assert_eq!(field.particles().len(), DEFAULT_PARTICLES);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!((1.0..3.0).contains(&p.speed));
            assert!((1.0..3.0).contains(&p.size));
        }
    }

    #[test]
    fn same_category_keeps_particles() {
        let mut field = rain_field();
        let before = field.particles().to_vec();
        field.set_category(WeatherCategory::Rain);
        assert_eq!(field.particles(), before.as_slice());

        field.set_category(WeatherCategory::Cloudy);
        assert_ne!(field.particles(), before.as_slice());
        assert_eq!(field.category(), WeatherCategory::Cloudy);
    }

    #[test]
    fn rain_draws_streaks_and_falls() {
        let mut field = rain_field();
        let start = field.particles()[0];
        let mut canvas = ShapeBuffer::default();

        field.frame(&mut canvas);

        assert_eq!(canvas.shapes.len(), DEFAULT_PARTICLES);
        assert_eq!(
            canvas.shapes[0],
            Shape::Line { from: (start.x, start.y), to: (start.x, start.y + 14.0) }
        );
        let moved = field.particles()[0];
        let expected = start.y + start.speed * 4.0;
        if expected > 600.0 {
            assert_eq!(moved.y, 0.0);
        } else {
            assert_eq!(moved.y, expected);
        }
        assert_eq!(moved.x, start.x);
    }

    #[test]
    fn rain_wraps_to_top() {
        let mut field = rain_field();
        let mut canvas = ShapeBuffer::default();
        field.run_frames(&mut canvas, 500);
        for p in field.particles() {
            assert!(p.y >= 0.0 && p.y <= 600.0);
        }
    }

    #[test]
    fn clouds_draw_circles_and_drift_right() {
        let mut field = ParticleField::seeded(10, 100.0, 50.0, 3);
        field.set_category(WeatherCategory::Cloudy);
        let start = field.particles()[0];
        let mut canvas = ShapeBuffer::default();

        field.frame(&mut canvas);

        assert_eq!(
            canvas.shapes[0],
            Shape::Circle { center: (start.x, start.y), radius: start.size * 6.0 }
        );
        let moved = field.particles()[0];
        assert_eq!(moved.y, start.y);
        assert!(moved.x == 0.0 || (moved.x - (start.x + start.speed * 0.3)).abs() < 1e-9);

        field.run_frames(&mut canvas, 2000);
        assert!(field.particles().iter().all(|p| p.x <= 100.0));
    }

    #[test]
    fn sunny_draws_nothing() {
        let mut field = ParticleField::seeded(10, 100.0, 50.0, 3);
        field.set_category(WeatherCategory::Sunny);
        let before = field.particles().to_vec();
        let mut canvas = ShapeBuffer::default();
        canvas.stroke_line((0.0, 0.0), (1.0, 1.0));

        field.run_frames(&mut canvas, 3);

        assert!(canvas.shapes.is_empty());
        assert_eq!(field.particles(), before.as_slice());
    }

    #[test]
    fn resize_updates_wrap_limits() {
        let mut field = rain_field();
        field.resize(200.0, 10.0);
        let mut canvas = ShapeBuffer::default();
        field.run_frames(&mut canvas, 5);
        assert_eq!(field.size(), (200.0, 10.0));
        assert!(field.particles().iter().all(|p| p.y <= 10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn animator_runs_until_stopped() {
        let field = rain_field().shared();
        let animator = Animator::start(field.clone(), Duration::from_millis(10));
        assert!(animator.is_running());

        tokio::time::sleep(Duration::from_millis(95)).await;
        let frames = animator.stop().await;

        assert!(frames >= 9, "ran {frames} frames");
    }
}
