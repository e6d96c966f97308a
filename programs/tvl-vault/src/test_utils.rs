use std::fmt::Debug;

use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Fails the test unless `result` is the given vault error
#[track_caller]
pub fn assert_vault_err<T: Debug>(result: Result<T>, expected: VaultError) {
    match result {
        Ok(value) => panic!("expected {:?}, got Ok({:?})", expected, value),
        Err(err) => assert_eq!(err, anchor_lang::error::Error::from(expected)),
    }
}
