// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;

/// Generates `count` distinct redemption codes.
///
/// Codes are 16 lowercase hex digits drawn from the thread-local RNG.
/// Uniqueness is guaranteed within the returned batch; the ledger's unique
/// constraint guards against collisions across campaigns.
#[must_use]
pub fn generate_redemption_codes(count: usize) -> Vec<String> {
    let mut seen: HashSet<u64> = HashSet::with_capacity(count);
    let mut codes: Vec<String> = Vec::with_capacity(count);

    while codes.len() < count {
        let value: u64 = rand::random::<u64>();
        if seen.insert(value) {
            codes.push(format!("{value:016x}"));
        }
    }

    codes
}
