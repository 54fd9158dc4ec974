//! User and cross-user tests → one alternative per user (or user pair).
//!
//! A user test over `[WORK_PROFILE, SECONDARY_USER]` offers two runs, each
//! placing the test on one of those users. A cross-user test over
//! `["WORK_PROFILE:INITIAL_USER"]` runs on the first user and names the second
//! as the "other" user, ensuring it exists when the two differ.

use super::{Prepass, PrepassError};
use crate::context::ResolutionContext;
use crate::model::{CompositeTrait, DeclaredTrait, TestTrait};
use crate::vocabulary::{self as v, UserType};

pub struct UserPass;

impl Prepass for UserPass {
    fn name(&self) -> &'static str {
        "user"
    }

    fn rewrite(
        &self,
        _ctx: &ResolutionContext,
        t: &DeclaredTrait,
    ) -> Result<Option<Vec<TestTrait>>, PrepassError> {
        match t.type_id.as_str() {
            v::USER_TEST => user_states(t).map(Some),
            v::CROSS_USER_TEST => cross_user_states(t).map(Some),
            _ => Ok(None),
        }
    }
}

fn parse_user(raw: &str) -> Result<UserType, PrepassError> {
    raw.parse()
        .map_err(|_| PrepassError::UnknownUserType(raw.to_string()))
}

fn runnable_user(raw: &str) -> Result<UserType, PrepassError> {
    let user = parse_user(raw)?;
    if !user.is_runnable() {
        return Err(PrepassError::IncompatibleUserType(user.to_string()));
    }
    Ok(user)
}

fn user_states(t: &DeclaredTrait) -> Result<Vec<TestTrait>, PrepassError> {
    t.str_list(v::VALUE)?
        .iter()
        .map(|raw| -> Result<TestTrait, PrepassError> {
            let user = runnable_user(raw)?;
            Ok(CompositeTrait::from_declared(user.as_str(), user.run_on().into_iter().collect()).into())
        })
        .collect()
}

fn cross_user_states(t: &DeclaredTrait) -> Result<Vec<TestTrait>, PrepassError> {
    t.str_list(v::VALUE)?
        .iter()
        .map(|pair| -> Result<TestTrait, PrepassError> {
            let (from, to) = pair
                .split_once(':')
                .ok_or_else(|| PrepassError::MalformedUserPair(pair.clone()))?;
            let from = runnable_user(from.trim())?;
            let to = parse_user(to.trim())?;

            let mut payload: Vec<DeclaredTrait> = from.run_on().into_iter().collect();
            payload.push(v::other_user(to));
            if from != to {
                payload.extend(to.has_user());
            }
            Ok(CompositeTrait::from_declared(format!("{from}_to_{to}"), payload).into())
        })
        .collect()
}
