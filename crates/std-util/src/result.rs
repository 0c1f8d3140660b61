/// Unwraps an `Ok`, panicking with the debug form of the `Err` otherwise.
#[macro_export]
macro_rules! assert_ok {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(err) => panic!("expected `Ok`; got error: {err:?}"),
        }
    };
}

/// Unwraps an `Err`. An optional predicate method name is checked against the
/// returned error, e.g. `assert_err!(res, is_invalid_path)`.
#[macro_export]
macro_rules! assert_err {
    ($e:expr) => {
        match $e {
            Err(err) => err,
            Ok(v) => panic!("expected `Err`; got Ok({v:?})"),
        }
    };
    ($e:expr, $pred:ident) => {{
        let err = $crate::assert_err!($e);
        assert!(
            err.$pred(),
            "expected error matching `{}`; got: {err}",
            stringify!($pred)
        );
        err
    }};
}
