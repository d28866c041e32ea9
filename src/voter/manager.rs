use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use super::api::{Attributes, Decision, Vote, Voter};

/// How individual votes are folded into one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Any deny wins; otherwise granted once a single voter grants.
    #[default]
    Affirmative,
    /// Majority of non-abstaining votes.
    Consensus,
    /// Every requested attribute needs a grant and no attribute may be denied.
    Unanimous,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    granted: usize,
    denied: usize,
}

/// Registry of voters plus the aggregation policy. Decisions are never cached: subject and
/// attributes change per call.
pub struct VoterManager<U> {
    voters: Vec<Arc<dyn Voter<U>>>,
    strategy: Strategy,
    allow_if_all_abstain: bool,
    allow_if_equal_granted_denied: bool,
}

impl<U> VoterManager<U> {
    pub fn new(strategy: Strategy) -> Self {
        Self { voters: Vec::new(), strategy, allow_if_all_abstain: false, allow_if_equal_granted_denied: true }
    }

    pub fn with_voter<V: Voter<U> + 'static>(mut self, voter: V) -> Self {
        self.voters.push(Arc::new(voter));
        self
    }

    pub fn register(&mut self, voter: Arc<dyn Voter<U>>) { self.voters.push(voter); }

    /// Outcome when no voter cast a grant or a deny. Defaults to denied.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }

    /// Consensus tie-break. Defaults to granted.
    pub fn allow_if_equal_granted_denied(mut self, allow: bool) -> Self {
        self.allow_if_equal_granted_denied = allow;
        self
    }

    pub fn strategy(&self) -> Strategy { self.strategy }
    pub fn len(&self) -> usize { self.voters.len() }
    pub fn is_empty(&self) -> bool { self.voters.is_empty() }

    pub fn vote<A: Into<Attributes>>(&self, actor: &U, subject: &dyn Any, attributes: A) -> Decision {
        let attributes = attributes.into();
        let decision = match self.strategy {
            Strategy::Affirmative => self.decide_affirmative(actor, subject, &attributes),
            Strategy::Consensus => self.decide_consensus(actor, subject, &attributes),
            Strategy::Unanimous => self.decide_unanimous(actor, subject, &attributes),
        };
        debug!(target: "portcullis::voter", strategy = ?self.strategy, attributes = ?attributes, decision = ?decision, "vote");
        decision
    }

    fn abstained(&self) -> Decision {
        if self.allow_if_all_abstain { Decision::Granted } else { Decision::Denied }
    }

    fn votes_for<'a>(&'a self, actor: &'a U, subject: &'a dyn Any, attribute: &'a str) -> impl Iterator<Item = Vote> + 'a {
        // voters that do not support the pair take no part
        self.voters
            .iter()
            .filter(move |v| v.supports(subject, attribute))
            .map(move |v| v.vote_on(actor, subject, attribute))
    }

    fn decide_affirmative(&self, actor: &U, subject: &dyn Any, attributes: &Attributes) -> Decision {
        let mut granted = 0usize;
        for attribute in attributes.iter() {
            for vote in self.votes_for(actor, subject, attribute) {
                match vote {
                    Vote::Denied => return Decision::Denied,
                    Vote::Granted => granted += 1,
                    Vote::Abstain => {}
                }
            }
        }
        if granted > 0 { Decision::Granted } else { self.abstained() }
    }

    fn decide_consensus(&self, actor: &U, subject: &dyn Any, attributes: &Attributes) -> Decision {
        let mut t = Tally::default();
        for attribute in attributes.iter() {
            for vote in self.votes_for(actor, subject, attribute) {
                match vote {
                    Vote::Granted => t.granted += 1,
                    Vote::Denied => t.denied += 1,
                    Vote::Abstain => {}
                }
            }
        }
        if t.granted > t.denied {
            Decision::Granted
        } else if t.denied > t.granted {
            Decision::Denied
        } else if t.granted > 0 {
            if self.allow_if_equal_granted_denied { Decision::Granted } else { Decision::Denied }
        } else {
            self.abstained()
        }
    }

    fn decide_unanimous(&self, actor: &U, subject: &dyn Any, attributes: &Attributes) -> Decision {
        let mut all_attributes_granted = true;
        let mut total_granted = 0usize;
        for attribute in attributes.iter() {
            let mut granted = 0usize;
            for vote in self.votes_for(actor, subject, attribute) {
                match vote {
                    Vote::Denied => return Decision::Denied,
                    Vote::Granted => granted += 1,
                    Vote::Abstain => {}
                }
            }
            if granted == 0 { all_attributes_granted = false; }
            total_granted += granted;
        }
        if total_granted == 0 {
            self.abstained()
        } else if all_attributes_granted {
            Decision::Granted
        } else {
            Decision::Denied
        }
    }
}

impl<U> Default for VoterManager<U> {
    fn default() -> Self { Self::new(Strategy::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Doc;
    struct Invoice;

    /// Votes a fixed value on one attribute of `Doc` subjects.
    struct Fixed {
        attribute: &'static str,
        vote: Vote,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(attribute: &'static str, vote: Vote) -> Self { Self { attribute, vote, calls: AtomicUsize::new(0) } }
    }

    impl Voter<String> for Fixed {
        fn supports(&self, subject: &dyn Any, attribute: &str) -> bool {
            subject.is::<Doc>() && attribute == self.attribute
        }
        fn vote_on(&self, _actor: &String, _subject: &dyn Any, _attribute: &str) -> Vote {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.vote
        }
    }

    struct AlwaysAbstain;

    impl Voter<String> for AlwaysAbstain {
        fn supports(&self, _subject: &dyn Any, _attribute: &str) -> bool { true }
        fn vote_on(&self, _actor: &String, _subject: &dyn Any, _attribute: &str) -> Vote { Vote::Abstain }
    }

    fn actor() -> String { "ann".to_string() }

    #[test]
    fn affirmative_grant_with_abstainer() {
        let m = VoterManager::default()
            .with_voter(Fixed::new("edit", Vote::Granted))
            .with_voter(AlwaysAbstain);
        assert_eq!(m.vote(&actor(), &Doc, ["edit"]), Decision::Granted);
    }

    #[test]
    fn affirmative_single_deny_wins() {
        let m = VoterManager::default()
            .with_voter(Fixed::new("edit", Vote::Granted))
            .with_voter(AlwaysAbstain)
            .with_voter(Fixed::new("edit", Vote::Denied))
            .with_voter(Fixed::new("edit", Vote::Granted));
        assert_eq!(m.vote(&actor(), &Doc, ["edit"]), Decision::Denied);
    }

    #[test]
    fn deny_on_any_attribute_denies_all() {
        let m = VoterManager::default()
            .with_voter(Fixed::new("view", Vote::Granted))
            .with_voter(Fixed::new("delete", Vote::Denied));
        assert_eq!(m.vote(&actor(), &Doc, ["view"]), Decision::Granted);
        assert_eq!(m.vote(&actor(), &Doc, ["view", "delete"]), Decision::Denied);
    }

    #[test]
    fn unsupported_subject_or_attribute_abstains() {
        let m = VoterManager::default().with_voter(Fixed::new("edit", Vote::Granted));
        assert_eq!(m.vote(&actor(), &Invoice, "edit"), Decision::Denied);
        assert_eq!(m.vote(&actor(), &Doc, "publish"), Decision::Denied);
        let lenient = VoterManager::default().with_voter(Fixed::new("edit", Vote::Granted)).allow_if_all_abstain(true);
        assert_eq!(lenient.vote(&actor(), &Doc, "publish"), Decision::Granted);
    }

    #[test]
    fn non_supporting_voters_are_not_asked() {
        let edit = Arc::new(Fixed::new("edit", Vote::Granted));
        let mut m: VoterManager<String> = VoterManager::default();
        m.register(edit.clone());
        m.vote(&actor(), &Doc, "view");
        m.vote(&actor(), &Invoice, "edit");
        assert_eq!(edit.calls.load(Ordering::SeqCst), 0);
        m.vote(&actor(), &Doc, "edit");
        assert_eq!(edit.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_attributes_follow_abstain_rule() {
        let m = VoterManager::default().with_voter(Fixed::new("edit", Vote::Granted));
        assert_eq!(m.vote(&actor(), &Doc, Vec::<String>::new()), Decision::Denied);
    }

    #[test]
    fn single_and_list_forms_agree() {
        let m = VoterManager::default().with_voter(Fixed::new("edit", Vote::Granted));
        assert_eq!(m.vote(&actor(), &Doc, "edit"), m.vote(&actor(), &Doc, vec!["edit"]));
    }

    #[test]
    fn consensus_majority_and_ties() {
        let m = VoterManager::new(Strategy::Consensus)
            .with_voter(Fixed::new("edit", Vote::Granted))
            .with_voter(Fixed::new("edit", Vote::Granted))
            .with_voter(Fixed::new("edit", Vote::Denied));
        assert_eq!(m.vote(&actor(), &Doc, "edit"), Decision::Granted);

        let tie = VoterManager::new(Strategy::Consensus)
            .with_voter(Fixed::new("edit", Vote::Granted))
            .with_voter(Fixed::new("edit", Vote::Denied));
        assert_eq!(tie.vote(&actor(), &Doc, "edit"), Decision::Granted);
        let strict_tie = tie.allow_if_equal_granted_denied(false);
        assert_eq!(strict_tie.vote(&actor(), &Doc, "edit"), Decision::Denied);
    }

    #[test]
    fn unanimous_requires_grant_per_attribute() {
        let m = VoterManager::new(Strategy::Unanimous)
            .with_voter(Fixed::new("view", Vote::Granted))
            .with_voter(Fixed::new("edit", Vote::Granted));
        assert_eq!(m.vote(&actor(), &Doc, ["view", "edit"]), Decision::Granted);
        assert_eq!(m.vote(&actor(), &Doc, ["view", "publish"]), Decision::Denied);

        let deny = VoterManager::new(Strategy::Unanimous)
            .with_voter(Fixed::new("view", Vote::Granted))
            .with_voter(Fixed::new("view", Vote::Denied));
        assert_eq!(deny.vote(&actor(), &Doc, "view"), Decision::Denied);
        assert_eq!(deny.strategy(), Strategy::Unanimous);
        assert_eq!(deny.len(), 2);
    }
}
