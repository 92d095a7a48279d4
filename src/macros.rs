//! The `receive!` macro: literal `match`-like syntax over an ordered
//! predicate list, expanding a `Type(binding) [if guard] => body` arm list
//! into a call to `receive_wait`.
//!
//! Each arm decodes the mailbox's next candidate envelope as `$ty`; a guard
//! that fails, or a decode that fails outright (wrong fingerprint), rejects
//! that arm without consuming the message, exactly like
//! [`crate::primitives::match_type`] built by hand. Arms are tried in the
//! order written.

/// Expands into a call to [`crate::primitives::receive_wait`] over one
/// predicate per arm.
///
/// ```no_run
/// # use strand::receive;
/// # async fn example() -> i32 {
/// receive! {
///     i32(n) if n % 2 == 0 => n,
///     i32(n) => n * -1,
/// }
/// # }
/// ```
#[macro_export]
macro_rules! receive {
    ( $( $ty:ty ($pat:pat) $(if $guard:expr)? => $body:expr ),+ $(,)? ) => {{
        let predicates: ::std::vec::Vec<$crate::primitives::Predicate<'_, _>> = ::std::vec![
            $(
                ::std::boxed::Box::new(move |envelope: &$crate::message::Envelope| {
                    match $crate::message::try_decode::<$ty>(envelope) {
                        ::std::result::Result::Ok($pat) $(if $guard)? => ::std::option::Option::Some($body),
                        _ => ::std::option::Option::None,
                    }
                }) as $crate::primitives::Predicate<'_, _>
            ),+
        ];
        $crate::primitives::receive_wait(&predicates).await
    }};
}

#[cfg(test)]
mod tests {
    use crate::process::context::{ProcessContext, CURRENT_PROCESS};
    use crate::process::spawn::test_support::test_node;
    use crate::{primitives, receive};
    use std::sync::Arc;

    #[tokio::test]
    async fn matches_first_satisfied_arm_in_order() {
        let node = test_node();
        let ctx = Arc::new(ProcessContext::new_for_test(node));
        CURRENT_PROCESS
            .scope(ctx, async move {
                let me = primitives::get_self_pid();
                primitives::send(me, 1i32);
                primitives::send(me, 2i32);
                primitives::send(me, 3i32);

                let first: i32 = receive! {
                    i32(n) if n % 2 == 0 => n,
                };
                assert_eq!(first, 2);

                let second: i32 = receive! {
                    i32(n) => n,
                };
                let third: i32 = receive! {
                    i32(n) => n,
                };
                assert_eq!(second, 1);
                assert_eq!(third, 3);
            })
            .await;
    }
}
