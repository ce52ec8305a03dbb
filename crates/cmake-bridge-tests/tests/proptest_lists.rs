//! Property-based tests for list encoding and remainder forwarding.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cmake-bridge-tests --test proptest_lists
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use cmake_bridge::{decode_list, encode_list, uq, Bridge, CommandRuntime, Signature};
use cmake_bridge_tests::MemoryRuntime;

/// List elements: anything without the separator, including empty strings.
fn element() -> impl Strategy<Value = String> {
    "[^;]{0,12}"
}

/// Arguments that survive unquoted expansion: non-empty, no list or
/// reference syntax.
fn plain_argument() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./-]{1,10}"
}

proptest! {
    /// Decoding an encoded non-empty sequence gives the sequence back.
    #[test]
    fn encode_decode_roundtrip(items in prop::collection::vec(element(), 1..16)) {
        let encoded = encode_list(&items);
        prop_assert_eq!(decode_list(Some(encoded.as_str())), Some(items));
    }

    /// A set variable always decodes to at least one element.
    #[test]
    fn decode_never_empty(raw in ".{0,40}") {
        let decoded = decode_list(Some(raw.as_str())).unwrap();
        prop_assert!(!decoded.is_empty());
        prop_assert_eq!(encode_list(&decoded), raw);
    }

    /// Values set through the runtime read back as the same list.
    #[test]
    fn runtime_list_roundtrip(items in prop::collection::vec(plain_argument(), 1..8)) {
        let rt = MemoryRuntime::new();
        let bridge = Bridge::new(&rt);
        bridge.set("LIST", &items).unwrap();
        prop_assert_eq!(bridge.get_list("LIST"), Some(items));
    }

    /// Literal tokens reach the runtime byte-for-byte.
    #[test]
    fn unquoted_passes_through(token in "[^$]{0,20}") {
        let rt = MemoryRuntime::new();
        rt.call("function", &["echo_args"]).unwrap();
        rt.call("endfunction", &[]).unwrap();
        Bridge::new(&rt).invoke_command("echo_args", [uq(token.clone())]).unwrap();
        let expected: Vec<String> = token
            .split(';')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let calls = rt.calls_to("echo_args");
        prop_assert_eq!(&calls[0].args, &expected);
    }

    /// K named plus M extra arguments reach a variadic export in order.
    #[test]
    fn remainder_forwarded_in_order(
        fixed in prop::collection::vec(plain_argument(), 0..4),
        extra in prop::collection::vec(plain_argument(), 0..6),
    ) {
        let rt = MemoryRuntime::new();
        let bridge = Bridge::new(&rt);
        let params: Vec<String> = (0..fixed.len()).map(|i| format!("p{}", i)).collect();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        bridge
            .export(Signature::new("target").params(params).variadic("rest"), move |_, args| {
                *sink.borrow_mut() = Some((args.fixed().to_vec(), args.rest().to_vec()));
                Ok(())
            })
            .unwrap();

        let all: Vec<&str> = fixed.iter().chain(extra.iter()).map(String::as_str).collect();
        rt.call("target", &all).unwrap();

        prop_assert_eq!(seen.borrow().clone(), Some((fixed.clone(), extra.clone())));
        prop_assert_eq!(rt.registry().depth(), 0);
    }

    /// The same call against a fixed-arity export fails exactly when M > 0.
    #[test]
    fn fixed_arity_rejects_any_extra(
        fixed in prop::collection::vec(plain_argument(), 0..4),
        extra in prop::collection::vec(plain_argument(), 0..4),
    ) {
        let rt = MemoryRuntime::new();
        let bridge = Bridge::new(&rt);
        let params: Vec<String> = (0..fixed.len()).map(|i| format!("p{}", i)).collect();
        bridge
            .export(Signature::new("target").params(params), |_, _| Ok(()))
            .unwrap();

        let all: Vec<&str> = fixed.iter().chain(extra.iter()).map(String::as_str).collect();
        let result = rt.call("target", &all);

        if extra.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(err.code(), "B102");
        }
    }
}
