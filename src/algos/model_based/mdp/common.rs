use crate::common::defs::*;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::ValueTable;

/// First action with the strictly highest score, in the order given.
pub fn argmax<F>(actions: &[Action], mut score: F) -> Result<Option<(Action, Continous)>>
where
    F: FnMut(Action) -> Result<Continous>,
{
    let mut best: Option<(Action, Continous)> = None;
    for &a in actions {
        let v = score(a)?;
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((a, v));
        }
    }

    Ok(best)
}

/// Bellman backup `r(s, a) + γ·V(s')`. Entering a terminal state earns no immediate reward,
/// its value already carries it.
pub fn backup<M: Mdp + ?Sized>(
    mdp: &M,
    values: &ValueTable<M::State>,
    s: &M::State,
    a: Action,
    gamma: Continous,
) -> Result<Continous> {
    let next = mdp.next_state(s, a);
    let reward = if mdp.is_end(&next) {
        0.
    } else {
        mdp.immediate_reward(s, a)
    };

    Ok(reward + gamma * values.checked(&next)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MdpError;

    #[test]
    fn argmax_keeps_first_of_ties() {
        let scores = [0.5, 0.9, 0.9, 0.1];
        let best = argmax(&Action::ALL, |a| Ok(scores[a as usize])).unwrap();

        assert_eq!(best, Some((Action::Right, 0.9)));
    }

    #[test]
    fn argmax_of_nothing_is_none() {
        assert_eq!(argmax(&[], |_| Ok(1.)).unwrap(), None);
    }

    #[test]
    fn argmax_propagates_errors() {
        let res = argmax(&Action::ALL, |_| Err(MdpError::UnknownState("x".into())));

        assert!(res.is_err());
    }
}
