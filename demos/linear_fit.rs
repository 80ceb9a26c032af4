//! Fits a small linear map with MadamCS.
//!
//! Run with `RUST_LOG=info cargo run --example linear_fit`.

use log::info;
use madamcs::{GroupedStore, MadamCs, MadamCsConfig, Optimizer};
use ndarray::{Array2, Ix2, array};

const EPOCHS: usize = 200;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let target: Array2<f32> = array![[0.8, -0.4, 0.3], [-0.2, 0.6, 0.9]];
    let inputs: Array2<f32> = array![
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.5, -0.5, 0.25],
    ];
    let outputs = inputs.dot(&target.t());

    // The update is multiplicative, a weight never changes its sign.
    let init: Array2<f32> = array![[0.5, -0.5, 0.5], [-0.5, 0.5, 0.5]];

    let mut store = GroupedStore::new();
    let weights = store.add_group(None, [init.into_dyn()])[0];

    let mut optimizer = MadamCs::new(MadamCsConfig::new(0.05))?;
    let samples = inputs.nrows() as f32;

    for epoch in 0..EPOCHS {
        let loss = optimizer.step_with_closure(&mut store, |store| -> anyhow::Result<f32> {
            let w = store
                .param(weights)
                .ok_or_else(|| anyhow::anyhow!("missing weights"))?
                .value()
                .view()
                .into_dimensionality::<Ix2>()?
                .to_owned();

            let error = inputs.dot(&w.t()) - &outputs;
            let loss = error.mapv(|e| e * e).sum() / samples;
            let grad = error.t().dot(&inputs) * (2. / samples);

            store.set_grad(weights, grad.into_dyn())?;
            Ok(loss)
        })??;

        if epoch % 20 == 0 {
            info!("epoch {epoch}: loss={loss:.6}");
        }
    }

    let fitted = store
        .param(weights)
        .ok_or_else(|| anyhow::anyhow!("missing weights"))?
        .value();

    info!("fitted weights:\n{fitted:.3}");
    info!("target weights:\n{target:.3}");
    Ok(())
}
