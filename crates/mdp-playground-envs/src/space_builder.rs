//! Observation/action spaces of a toy environment and the encodings between
//! internal states/actions and what crosses the `Env` boundary.

use crate::config::{MdpKind, ToyEnvSpec};
use crate::image::ImageRenderer;
use mdp_playground::rng::RandomStreams;
use mdp_playground::spaces::{Box as BoxSpace, Discrete, DynSpace, MultiDiscrete};
use mdp_playground::Result;
use ndarray::{Array1, ArrayD};
use rand::seq::SliceRandom;
use rand::Rng;

/// An action decoded into internal ids or values.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedAction {
    Discrete {
        relevant: usize,
        irrelevant: Option<usize>,
    },
    Continuous {
        values: Array1<f64>,
        clipped: bool,
    },
}

#[derive(Clone, Debug)]
pub struct SpaceLayout {
    observation_space: DynSpace,
    action_space: DynSpace,
    /// internal state id -> observed id
    state_relabel: Option<Vec<usize>>,
    /// external action id -> internal action id
    action_relabel: Option<Vec<usize>>,
    image: Option<ImageRenderer>,
}

fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..n).collect();
    ids.shuffle(rng);
    ids
}

impl SpaceLayout {
    /// Build spaces for `spec`. Relabeling permutations take the first draws
    /// of the representation stream.
    pub fn build(spec: &ToyEnvSpec, streams: &mut RandomStreams) -> Self {
        match &spec.kind {
            MdpKind::Discrete(d) => {
                let (state_relabel, action_relabel) = if d.shuffle_representations {
                    let states = permutation(d.state_space_size, &mut streams.representation);
                    let actions = permutation(d.action_space_size, &mut streams.representation);
                    (Some(states), Some(actions))
                } else {
                    (None, None)
                };

                let image = d.image.clone().map(ImageRenderer::new);
                let observation_space = match (&image, d.irrelevant) {
                    (Some(renderer), irr) => {
                        let parts = if irr.is_some() { 2 } else { 1 };
                        DynSpace::Box(BoxSpace::unit(&renderer.shape(parts)))
                    }
                    (None, Some((irr_states, _))) => DynSpace::MultiDiscrete(MultiDiscrete::new(
                        vec![d.state_space_size, irr_states],
                    )),
                    (None, None) => DynSpace::Discrete(Discrete::new(d.state_space_size)),
                };
                let action_space = match d.irrelevant {
                    Some((_, irr_actions)) => DynSpace::MultiDiscrete(MultiDiscrete::new(vec![
                        d.action_space_size,
                        irr_actions,
                    ])),
                    None => DynSpace::Discrete(Discrete::new(d.action_space_size)),
                };

                Self {
                    observation_space,
                    action_space,
                    state_relabel,
                    action_relabel,
                    image,
                }
            }
            MdpKind::Continuous(c) => {
                let n = c.total_dim();
                let obs_max = c.state_space_max as f32;
                let act_max = c.action_space_max as f32;
                Self {
                    observation_space: DynSpace::Box(BoxSpace::uniform(&[n], -obs_max, obs_max)),
                    action_space: DynSpace::Box(BoxSpace::uniform(&[n], -act_max, act_max)),
                    state_relabel: None,
                    action_relabel: None,
                    image: None,
                }
            }
        }
    }

    pub fn observation_space(&self) -> &DynSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> &DynSpace {
        &self.action_space
    }

    /// Validate and decode an action without touching any state.
    pub fn decode_action(&self, action: &ArrayD<f32>) -> Result<DecodedAction> {
        let relabel = |a: usize| match &self.action_relabel {
            Some(map) => map[a],
            None => a,
        };
        match &self.action_space {
            DynSpace::Discrete(space) => Ok(DecodedAction::Discrete {
                relevant: relabel(space.decode(action)?),
                irrelevant: None,
            }),
            DynSpace::MultiDiscrete(space) => {
                let ids = space.decode(action)?;
                Ok(DecodedAction::Discrete {
                    relevant: relabel(ids[0]),
                    irrelevant: ids.get(1).copied(),
                })
            }
            DynSpace::Box(space) => {
                let (values, clipped) = space.clip_decode(action)?;
                Ok(DecodedAction::Continuous { values, clipped })
            }
        }
    }

    /// Observed id of an internal state.
    pub fn state_label(&self, state: usize) -> usize {
        match &self.state_relabel {
            Some(map) => map[state],
            None => state,
        }
    }

    /// Observation of a discrete state. Image transforms draw from `rng`.
    pub fn observe_discrete<R: Rng + ?Sized>(
        &self,
        state: usize,
        irrelevant: Option<usize>,
        rng: &mut R,
    ) -> ArrayD<f32> {
        let label = self.state_label(state);
        let mut ids = vec![label];
        ids.extend(irrelevant);
        match &self.image {
            Some(renderer) => renderer.render(&ids, rng).into_dyn(),
            None => Array1::from(ids.into_iter().map(|x| x as f32).collect::<Vec<_>>()).into_dyn(),
        }
    }

    /// Observation of a continuous position (relevant then irrelevant dims).
    pub fn observe_continuous(&self, position: &[f64]) -> ArrayD<f32> {
        Array1::from(position.iter().map(|&x| x as f32).collect::<Vec<_>>()).into_dyn()
    }
}
