// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InsufficientBalance {
        requested: 500,
        available: 150,
    };
    assert_eq!(
        format!("{err}"),
        "Insufficient balance: requested 500, available 150"
    );

    let err: DomainError = DomainError::InvalidAffiliateStatus(String::from("frozen"));
    assert_eq!(format!("{err}"), "Invalid affiliate status: frozen");

    let err: DomainError = DomainError::InvalidAmountPerCode(0);
    assert_eq!(
        format!("{err}"),
        "Invalid amount per code: 0. Must be greater than 0"
    );

    let err: DomainError = DomainError::DuplicateCode(String::from("abc"));
    assert_eq!(format!("{err}"), "Duplicate redemption code: abc");

    let err: DomainError = DomainError::InvalidTimezone(String::from("Mars/Olympus"));
    assert_eq!(format!("{err}"), "Invalid timezone: Mars/Olympus");

    let err: DomainError = DomainError::InvalidExpiration(-1);
    assert_eq!(
        format!("{err}"),
        "Invalid expiration: -1. Must be 0 or a positive unix timestamp"
    );
}
