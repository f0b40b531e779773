use super::*;

#[test]
fn canonicalize_joins_and_lowercases() {
    assert_eq!(canonicalize(&["Int8", "4096", "BF16"]), "int8_4096_bf16");
    assert_eq!(canonicalize::<&str>(&[]), "");
    assert_eq!(canonicalize(&["single"]), "single");
}

#[test]
fn canonicalize_does_not_escape_delimiter() {
    assert_eq!(canonicalize(&["a_b", "c"]), canonicalize(&["a", "b_c"]));
}

#[test]
fn digest_matches_known_md5_vectors() {
    assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(digest("message digest"), "f96b697d7cb7938d525a2f31aaf161d0");
}

#[test]
fn digest_is_32_lowercase_hex_digits() {
    let hex = digest("int8_4096_bf16");
    assert_eq!(hex.len(), 32);
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn kernel_id_is_module_plus_digest() {
    let id = KernelId::derive("module_gemm", "abc");
    assert_eq!(id.as_str(), "module_gemm_900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(id.to_string(), id.as_str());
}

#[test]
fn case_differences_collapse_to_one_identifier() {
    let upper: ArgumentSignature = ["A", "B"].into_iter().collect();
    let lower: ArgumentSignature = ["a", "b"].into_iter().collect();
    assert_eq!(KernelId::for_signature("m", &upper), KernelId::for_signature("m", &lower));
}

#[test]
fn signature_builder_preserves_order() {
    let sig = ArgumentSignature::new().arg("x").arg(16).arg("Y");
    assert_eq!(sig.tokens(), ["x", "16", "Y"]);
    assert_eq!(sig.canonical(), "x_16_y");
    assert_ne!(
        KernelId::for_signature("m", &sig),
        KernelId::for_signature("m", &ArgumentSignature::new().arg(16).arg("x").arg("Y"))
    );
}

#[test]
fn sampled_distinct_signatures_get_distinct_identifiers() {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOKENS: [&str; 8] = ["int8", "bf16", "fp16", "fp32", "true", "false", "rowwise", "causal"];

    let mut rng = StdRng::seed_from_u64(0x5eed_a17e);
    let mut seen: HashMap<String, String> = HashMap::new();
    for _ in 0..10_000 {
        let len = rng.random_range(1..=6);
        let sig: ArgumentSignature = (0..len)
            .map(|_| {
                if rng.random_bool(0.5) {
                    TOKENS[rng.random_range(0..TOKENS.len())].to_string()
                } else {
                    rng.random_range(1u32..=65_536).to_string()
                }
            })
            .collect();
        let canonical = sig.canonical();
        let id = KernelId::for_signature("module_sweep", &sig);
        match seen.get(id.as_str()) {
            Some(previous) => assert_eq!(previous, &canonical, "identifier collision for {id}"),
            None => {
                seen.insert(id.as_str().to_string(), canonical);
            }
        }
    }
    assert!(seen.len() > 8_000, "sweep produced too few distinct signatures: {}", seen.len());
}
