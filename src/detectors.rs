//! 检测器 = 独占的估计器 + 信号引擎
//!
//! 估计器在构造时获得，`close()` 时释放；未显式关闭的检测器在 drop 时释放，
//! 保证任何退出路径上都只释放一次。

use health_signals::{
    BlinkConfig, BlinkEngine, BlinkOutput, EyePair, PostureConfig, PostureEngine, PostureOutput,
    TorsoSample,
};

use crate::estimator::LandmarkEstimator;
use crate::frame::Frame;

pub struct BlinkDetector<E>
where
    E: LandmarkEstimator<Output = EyePair>,
{
    estimator: E,
    engine: BlinkEngine,
    closed: bool,
}

impl<E> BlinkDetector<E>
where
    E: LandmarkEstimator<Output = EyePair>,
{
    pub fn new(estimator: E, config: BlinkConfig) -> Self {
        Self {
            estimator,
            engine: BlinkEngine::new(config),
            closed: false,
        }
    }

    pub fn process(&mut self, frame: &Frame) -> BlinkOutput {
        let eyes = self.estimator.estimate(frame);
        self.engine
            .process(eyes.as_ref(), frame.width, frame.height, frame.ts)
    }

    pub fn engine(&self) -> &BlinkEngine {
        &self.engine
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.estimator.close();
        }
    }
}

impl<E> Drop for BlinkDetector<E>
where
    E: LandmarkEstimator<Output = EyePair>,
{
    fn drop(&mut self) {
        self.close();
    }
}

pub struct PostureDetector<E>
where
    E: LandmarkEstimator<Output = TorsoSample>,
{
    estimator: E,
    engine: PostureEngine,
    closed: bool,
}

impl<E> PostureDetector<E>
where
    E: LandmarkEstimator<Output = TorsoSample>,
{
    pub fn new(estimator: E, config: PostureConfig) -> Self {
        Self {
            estimator,
            engine: PostureEngine::new(config),
            closed: false,
        }
    }

    pub fn process(&mut self, frame: &Frame) -> PostureOutput {
        let torso = self.estimator.estimate(frame);
        self.engine.process(torso.as_ref())
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.estimator.close();
        }
    }
}

impl<E> Drop for PostureDetector<E>
where
    E: LandmarkEstimator<Output = TorsoSample>,
{
    fn drop(&mut self) {
        self.close();
    }
}
