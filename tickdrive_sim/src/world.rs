//! RoadWorld - a planar kinematic road scene.
//!
//! Cars drive in a straight line along their heading at a constant speed.
//! Two cars whose centres come closer than twice the car radius collide: both
//! stop where they are and keep the speed they had at impact, so reports can
//! still tell how fast they were going.

use nalgebra::Vector3;
use std::time::{Duration, Instant};
use tickdrive_env::{AgentName, Collision, EnvError, ModelRunner, Pose, Velocity};
use tracing::debug;

/// Configuration for a road world.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Radius of the disc each car occupies (meters)
    pub car_radius: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { car_radius: 2.0 }
    }
}

/// A car in the scene.
#[derive(Debug, Clone)]
pub struct Car {
    /// Car name
    pub name: AgentName,
    
    /// Current pose
    pub pose: Pose,
    
    /// Speed along the heading (m/s)
    pub speed: f64,
    
    /// True once the car has hit another one
    pub crashed: bool,
}

impl Car {
    fn direction(&self) -> Vector3<f64> {
        Vector3::new(self.pose.heading.cos(), self.pose.heading.sin(), 0.0)
    }
}

/// The road scene driven by the demos.
#[derive(Debug)]
pub struct RoadWorld {
    config: WorldConfig,
    cars: Vec<Car>,
    collisions: Vec<Collision>,
    sim_time: Duration,
    paused: bool,
    rate: f64,
    
    /// Wall instant and sim time at the last rate change
    rate_anchor: (Instant, Duration),
}

impl RoadWorld {
    /// Creates an empty world.
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            cars: Vec::new(),
            collisions: Vec::new(),
            sim_time: Duration::ZERO,
            paused: false,
            rate: 1.0,
            rate_anchor: (Instant::now(), Duration::ZERO),
        }
    }
    
    /// Adds a car at `(x, y)` heading `heading` radians at `speed` m/s.
    pub fn with_car(mut self, name: &str, x: f64, y: f64, heading: f64, speed: f64) -> Self {
        self.cars.push(Car {
            name: AgentName::new(name),
            pose: Pose::new(x, y, heading),
            speed,
            crashed: false,
        });
        self
    }
    
    /// All cars, in insertion order.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }
    
    /// Looks a car up by name.
    pub fn car(&self, name: &AgentName) -> Option<&Car> {
        self.cars.iter().find(|car| &car.name == name)
    }
    
    fn car_or_err(&self, name: &AgentName) -> Result<&Car, EnvError> {
        self.car(name).ok_or_else(|| EnvError::unknown_agent(name))
    }
    
    fn detect_collisions(&mut self) {
        let reach = 2.0 * self.config.car_radius;
        let mut hits = Vec::new();
        
        for i in 0..self.cars.len() {
            for j in (i + 1)..self.cars.len() {
                let a = self.cars[i].pose.translation;
                let b = self.cars[j].pose.translation;
                if (a - b).norm() < reach {
                    hits.push((i, j, (a + b) / 2.0));
                }
            }
        }
        
        self.collisions.clear();
        for (i, j, location) in hits {
            self.cars[i].crashed = true;
            self.cars[j].crashed = true;
            self.collisions.push(Collision::new(
                self.cars[i].name.clone(),
                self.cars[j].name.clone(),
                location,
            ));
        }
    }
}

impl ModelRunner for RoadWorld {
    fn advance(&mut self, dt: Duration) -> Result<(), EnvError> {
        let secs = dt.as_secs_f64();
        for car in self.cars.iter_mut().filter(|car| !car.crashed) {
            car.pose.translation += car.direction() * car.speed * secs;
        }
        self.sim_time += dt;
        self.detect_collisions();
        
        if !self.collisions.is_empty() {
            debug!("{} contact(s) at t={:.2}s", self.collisions.len(), self.sim_time.as_secs_f64());
        }
        Ok(())
    }
    
    fn pause(&mut self) {
        self.paused = true;
    }
    
    fn resume(&mut self) {
        self.paused = false;
    }
    
    fn is_paused(&self) -> bool {
        self.paused
    }
    
    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.rate_anchor = (Instant::now(), self.sim_time);
    }
    
    fn rate(&self) -> f64 {
        self.rate
    }
    
    fn measured_rate(&self) -> f64 {
        let (since, sim_at) = self.rate_anchor;
        let wall = since.elapsed().as_secs_f64();
        if wall <= 0.0 {
            return self.rate;
        }
        self.sim_time.saturating_sub(sim_at).as_secs_f64() / wall
    }
    
    fn collisions(&self) -> Result<Vec<Collision>, EnvError> {
        Ok(self.collisions.clone())
    }
    
    fn velocity(&self, agent: &AgentName) -> Result<Velocity, EnvError> {
        let car = self.car_or_err(agent)?;
        Ok(Velocity::new(Vector3::zeros(), car.direction() * car.speed))
    }
    
    fn pose(&self, agent: &AgentName) -> Result<Pose, EnvError> {
        Ok(self.car_or_err(agent)?.pose)
    }
    
    fn set_speed(&mut self, agent: &AgentName, speed: f64) -> Result<(), EnvError> {
        let car = self
            .cars
            .iter_mut()
            .find(|car| &car.name == agent)
            .ok_or_else(|| EnvError::unknown_agent(agent))?;
        car.speed = speed;
        Ok(())
    }
    
    fn sim_time(&self) -> Duration {
        self.sim_time
    }
}
