#[macro_export]
macro_rules! assert_none {
    ($e:expr) => {
        if let Some(actual) = &$e {
            panic!("expected `None`; got Some({actual:?})");
        }
    };
}

#[macro_export]
macro_rules! assert_some {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => panic!("expected `Some`; got None from `{}`", stringify!($e)),
        }
    };
}
