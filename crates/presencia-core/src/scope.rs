//! Organisational visibility scoping for listing requests.
//!
//! The filter is derived once per request from the actor's authorization
//! level and passed to the repository as a predicate. Each level threshold
//! narrows the previous one; the thresholds compose conjunctively.

use crate::employee::RequestContext;

/// The subset of employees whose justifications an actor may list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
  /// Level 0 (or below): no visibility at all.
  DenyAll,
  /// Level 1: full visibility.
  Unrestricted,
  /// Level 2 and up: same general direction, then optionally the same
  /// direction (level ≥ 3) and subdirectorate (level ≥ 4).
  Scoped {
    general_direction_id: i64,
    direction_id:         Option<i64>,
    subdirectorate_id:    Option<i64>,
  },
}

impl ScopeFilter {
  pub fn for_context(ctx: &RequestContext) -> Self {
    match ctx.level {
      ..=0 => Self::DenyAll,
      1 => Self::Unrestricted,
      level => Self::Scoped {
        general_direction_id: ctx.general_direction_id,
        direction_id:         (level >= 3).then_some(ctx.direction_id),
        subdirectorate_id:    (level >= 4).then_some(ctx.subdirectorate_id),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn ctx(level: i32) -> RequestContext {
    RequestContext {
      actor_user_id:        Uuid::new_v4(),
      actor_name:           "tester".into(),
      level,
      general_direction_id: 7,
      direction_id:         3,
      subdirectorate_id:    9,
    }
  }

  #[test]
  fn level_zero_denies_everything() {
    assert_eq!(ScopeFilter::for_context(&ctx(0)), ScopeFilter::DenyAll);
    assert_eq!(ScopeFilter::for_context(&ctx(-1)), ScopeFilter::DenyAll);
  }

  #[test]
  fn level_one_is_unrestricted() {
    assert_eq!(ScopeFilter::for_context(&ctx(1)), ScopeFilter::Unrestricted);
  }

  #[test]
  fn level_two_scopes_to_general_direction_only() {
    assert_eq!(ScopeFilter::for_context(&ctx(2)), ScopeFilter::Scoped {
      general_direction_id: 7,
      direction_id:         None,
      subdirectorate_id:    None,
    });
  }

  #[test]
  fn level_three_adds_direction() {
    assert_eq!(ScopeFilter::for_context(&ctx(3)), ScopeFilter::Scoped {
      general_direction_id: 7,
      direction_id:         Some(3),
      subdirectorate_id:    None,
    });
  }

  #[test]
  fn level_four_and_above_add_subdirectorate() {
    let expected = ScopeFilter::Scoped {
      general_direction_id: 7,
      direction_id:         Some(3),
      subdirectorate_id:    Some(9),
    };
    assert_eq!(ScopeFilter::for_context(&ctx(4)), expected);
    assert_eq!(ScopeFilter::for_context(&ctx(5)), expected);
  }
}
