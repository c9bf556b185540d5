//! Decode and synthesis tests across all four link forms and both targets
//!
//! Covers:
//! - field extraction and defaulting for each link form
//! - the distinct decode error kinds
//! - per-protocol outbound shape for Xray and sing-box
//! - remote port policy, idempotence and JSON round-trips

#![cfg(test)]

use crate::{
    ConnectionProfile, DecodeError, Identity, OutboundSettings, Protocol, Singbox,
    SingboxDocument, SingboxInboundOptions, SingboxOutbound, SynthesisError, SynthesisOptions,
    Synthesizer, Target, V2RayTransport, Xray, XrayDocument, XrayInboundOptions, convert, decode,
    synthesize,
};
use base64::Engine;
use serde_json::{Value, json};
use serde_test::{Token, assert_de_tokens, assert_tokens};

fn vmess_link(json: &str) -> String {
    format!(
        "vmess://{}",
        base64::engine::general_purpose::STANDARD.encode(json)
    )
}

fn ss_link(credential: &str, rest: &str) -> String {
    format!(
        "ss://{}@{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(credential),
        rest
    )
}

const VLESS_LINK: &str = "vless://uuid@host:443?type=ws&path=/p&host=h&sni=s&fp=chrome&allowInsecure=1";

fn sample_links() -> Vec<String> {
    vec![
        vmess_link(
            r#"{"id":"7a8ec047-662b-4a9f-b89f-fd7d97eca90f","add":"vm.example.com","port":"443","net":"ws","path":"/ws","host":"cdn.example.com","tls":"tls","sni":"vm.example.com","alpn":"h2,http/1.1","fp":"chrome"}"#,
        ),
        "vless://1bb5b0c6-87c7-4e22-b95b-bb82bd88ba53@vl.example.com:443?encryption=none&security=tls&sni=vl.example.com&alpn=h2&fp=chrome&type=ws&host=cdn.example.com&path=%2Fws#vless".to_string(),
        ss_link("aes-256-gcm:secret", "ss.example.com:8388#ss"),
        "trojan://0ab6c98dae3b48e8b9c4a776b6c9c19a@139.59.119.143:443?security=tls&type=tcp&sni=tr.example.com#trojan".to_string(),
    ]
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("document is valid JSON")
}

fn render(link: &str, target: Target) -> Value {
    let profile = decode(link).unwrap();
    json_of(&synthesize(&profile, target, &SynthesisOptions::default()).unwrap())
}

// =============================================================================
// VMess
// =============================================================================

#[test]
fn vmess_minimal_fields() {
    let profile = decode(&vmess_link(r#"{"id":"u","add":"h","port":"443"}"#)).unwrap();
    assert_eq!(profile.protocol, Protocol::VMess);
    assert_eq!(profile.uuid(), Some("u"));
    assert_eq!(profile.address, "h");
    assert_eq!(profile.port, "443");
    // no "type" key: empty, not an error
    assert_eq!(profile.transport.header_type, "");
    assert_eq!(profile.transport.network, "");
    assert_eq!(profile.tls.security, "");
}

#[test]
fn vmess_numeric_port_rendered_as_text() {
    let profile = decode(&vmess_link(r#"{"id":"u","add":"h","port":8080}"#)).unwrap();
    assert_eq!(profile.port, "8080");
}

#[test]
fn vmess_wrong_typed_keys_are_empty() {
    let profile =
        decode(&vmess_link(r#"{"id":5,"add":"h","port":true,"net":["ws"],"path":null}"#)).unwrap();
    assert_eq!(profile.uuid(), Some(""));
    assert_eq!(profile.port, "");
    assert_eq!(profile.transport.network, "");
    assert_eq!(profile.transport.path, "");
}

#[test]
fn vmess_all_fields() {
    let link = vmess_link(
        r#"{"v":"2","ps":"名称","add":"example.com","port":"443","id":"uuid","aid":"0","net":"ws","type":"none","host":"cdn.example.com","path":"/ws","tls":"tls","alpn":"h2,http/1.1","fp":"chrome","sni":"sni.example.com"}"#,
    );
    let profile = decode(&link).unwrap();
    assert_eq!(profile.remark, "名称");
    assert_eq!(profile.transport.network, "ws");
    assert_eq!(profile.transport.header_type, "none");
    assert_eq!(profile.transport.host, "cdn.example.com");
    assert_eq!(profile.transport.path, "/ws");
    assert_eq!(profile.tls.security, "tls");
    assert_eq!(profile.tls.alpn, "h2,http/1.1");
    assert_eq!(profile.tls.fingerprint, "chrome");
    assert_eq!(profile.tls.server_name, "sni.example.com");
}

#[test]
fn vmess_fingerprint_falls_back_to_long_key() {
    let profile =
        decode(&vmess_link(r#"{"id":"u","add":"h","port":"1","fingerprint":"firefox"}"#)).unwrap();
    assert_eq!(profile.tls.fingerprint, "firefox");

    let profile = decode(&vmess_link(
        r#"{"id":"u","add":"h","port":"1","fp":"chrome","fingerprint":"firefox"}"#,
    ))
    .unwrap();
    assert_eq!(profile.tls.fingerprint, "chrome");
}

#[test]
fn vmess_prefix_case_and_whitespace() {
    let body =
        base64::engine::general_purpose::STANDARD.encode(r#"{"id":"u","add":"h","port":"1"}"#);
    let (head, tail) = body.split_at(8);
    let link = format!("  VMess://{}\n{} \n", head, tail);
    let profile = decode(&link).unwrap();
    assert_eq!(profile.address, "h");
}

#[test]
fn vmess_unpadded_base64_accepted() {
    let body = base64::engine::general_purpose::STANDARD_NO_PAD
        .encode(r#"{"id":"u","add":"a","port":"1"}"#);
    let profile = decode(&format!("vmess://{}", body)).unwrap();
    assert_eq!(profile.address, "a");
}

#[test]
fn vmess_invalid_base64() {
    let err = decode("vmess://!!!invalid!!!").unwrap_err();
    assert!(matches!(err, DecodeError::Base64Invalid(_)));
}

#[test]
fn vmess_invalid_json() {
    let err = decode(&vmess_link("not json")).unwrap_err();
    assert!(matches!(err, DecodeError::JsonInvalid(_)));
}

#[test]
fn vmess_json_must_be_object() {
    let err = decode(&vmess_link("[1,2,3]")).unwrap_err();
    assert!(matches!(err, DecodeError::JsonInvalid(_)));
}

// =============================================================================
// VLESS
// =============================================================================

#[test]
fn vless_query_fields() {
    let profile = decode(VLESS_LINK).unwrap();
    assert_eq!(profile.protocol, Protocol::VLess);
    assert_eq!(profile.uuid(), Some("uuid"));
    assert_eq!(profile.address, "host");
    assert_eq!(profile.port, "443");
    assert_eq!(profile.transport.network, "ws");
    assert_eq!(profile.transport.path, "/p");
    assert_eq!(profile.transport.host, "h");
    assert_eq!(profile.tls.server_name, "s");
    assert_eq!(profile.tls.fingerprint, "chrome");
    assert!(profile.tls.allows_insecure());
}

#[test]
fn vless_allow_insecure_requires_exact_one() {
    for value in ["yes", "true", "01", ""] {
        let link = format!("vless://u@h:443?allowInsecure={}", value);
        let profile = decode(&link).unwrap();
        assert!(!profile.tls.allows_insecure(), "allowInsecure={value}");
    }
    let profile = decode("vless://u@h:443").unwrap();
    assert!(!profile.tls.allows_insecure());
}

#[test]
fn vless_reality_and_transport_extras() {
    let link = "vless://u@h:443?security=reality&pbk=pubkey&sid=6ba85179&type=grpc&serviceName=svc&mode=gun&headerType=none&alpn=h2,http/1.1";
    let profile = decode(link).unwrap();
    assert_eq!(profile.tls.security, "reality");
    assert_eq!(profile.tls.public_key, "pubkey");
    assert_eq!(profile.tls.short_id, "6ba85179");
    assert_eq!(profile.tls.alpn_list(), vec!["h2", "http/1.1"]);
    assert_eq!(profile.transport.service_name, "svc");
    assert_eq!(profile.transport.mode, "gun");
    assert_eq!(profile.transport.header_type, "none");
}

#[test]
fn repeated_query_parameter_keeps_first_value() {
    let profile = decode("vless://u@h:443?sni=first&sni=second&type=ws&type=grpc").unwrap();
    assert_eq!(profile.tls.server_name, "first");
    assert_eq!(profile.transport.network, "ws");
}

#[test]
fn vless_fragment_percent_decoded() {
    let profile = decode("vless://u@h:80#%E5%A4%87%E6%B3%A8").unwrap();
    assert_eq!(profile.remark, "备注");
}

#[test]
fn vless_ipv6_brackets_stripped() {
    let profile = decode("vless://u@[2001:db8::1]:443").unwrap();
    assert_eq!(profile.address, "2001:db8::1");
}

#[test]
fn vless_missing_port_is_uri_error() {
    let err = decode("vless://uuid@example.com").unwrap_err();
    assert!(matches!(err, DecodeError::UriInvalid(_)));
}

#[test]
fn vless_non_numeric_port_is_uri_error() {
    let err = decode("vless://uuid@example.com:abc").unwrap_err();
    assert!(matches!(err, DecodeError::UriInvalid(_)));
}

#[test]
fn vless_missing_host_is_uri_error() {
    let err = decode("vless:uuid").unwrap_err();
    assert!(matches!(err, DecodeError::UriInvalid(_)));
}

// =============================================================================
// Shadowsocks
// =============================================================================

#[test]
fn ss_base64url_credential() {
    let profile = decode(&ss_link("aes-256-gcm:secret", "host:8388")).unwrap();
    assert_eq!(profile.protocol, Protocol::Shadowsocks);
    assert_eq!(profile.method(), Some("aes-256-gcm"));
    assert_eq!(profile.password(), Some("secret"));
    assert_eq!(profile.address, "host");
    assert_eq!(profile.port, "8388");
}

#[test]
fn ss_credential_with_extra_colon_is_malformed() {
    let err = decode(&ss_link("aes-256-gcm:a:b", "h:8388")).unwrap_err();
    assert!(matches!(err, DecodeError::ShadowsocksCredentialMalformed(_)));

    let err = decode(&ss_link("chacha20-ietf-poly1305:pa:ss", "host:1")).unwrap_err();
    assert!(matches!(err, DecodeError::ShadowsocksCredentialMalformed(_)));

    let err = decode("ss://aes-256-gcm:a%3Ab@host:443").unwrap_err();
    assert!(matches!(err, DecodeError::ShadowsocksCredentialMalformed(_)));
}

#[test]
fn ss_credential_without_colon_is_malformed() {
    let err = decode(&ss_link("onlyone", "host:8388")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::ShadowsocksCredentialMalformed("invalid Shadowsocks URI format".to_string())
    );
}

#[test]
fn ss_invalid_base64() {
    let err = decode("ss://!!!@host:8388").unwrap_err();
    assert!(matches!(err, DecodeError::Base64Invalid(_)));
}

#[test]
fn ss_padded_credential_accepted() {
    let profile = decode("ss://YWVzLTEyOC1nY206cHc=@host:8388").unwrap();
    assert_eq!(profile.method(), Some("aes-128-gcm"));
    assert_eq!(profile.password(), Some("pw"));
}

#[test]
fn ss_plain_userinfo() {
    let profile = decode("ss://2022-blake3-aes-128-gcm:YWJj%3D@host:443#plain").unwrap();
    assert_eq!(profile.method(), Some("2022-blake3-aes-128-gcm"));
    assert_eq!(profile.password(), Some("YWJj="));
    assert_eq!(profile.remark, "plain");
}

#[test]
fn ss_legacy_whole_body_form() {
    let link = format!(
        "ss://{}#tag",
        base64::engine::general_purpose::STANDARD.encode("aes-256-gcm:pw@1.2.3.4:8388")
    );
    let profile = decode(&link).unwrap();
    assert_eq!(profile.method(), Some("aes-256-gcm"));
    assert_eq!(profile.password(), Some("pw"));
    assert_eq!(profile.address, "1.2.3.4");
    assert_eq!(profile.port, "8388");
    assert_eq!(profile.remark, "tag");
}

#[test]
fn ss_plugin_kept() {
    let link = ss_link(
        "aes-256-gcm:secret",
        "host:8388/?plugin=obfs-local%3Bobfs%3Dhttp#n",
    );
    let profile = decode(&link).unwrap();
    assert_eq!(profile.plugin, "obfs-local;obfs=http");
    assert_eq!(profile.plugin_parts(), Some(("obfs-local", "obfs=http")));
}

// =============================================================================
// Trojan and dispatch
// =============================================================================

#[test]
fn trojan_password_and_fragment() {
    let profile = decode("trojan://pw@host:443#remark").unwrap();
    assert_eq!(profile.protocol, Protocol::Trojan);
    assert_eq!(profile.identity, Identity::Password("pw".to_string()));
    assert_eq!(profile.remark, "remark");
    assert_eq!(profile.port, "443");
}

#[test]
fn trojan_password_percent_decoded_and_tls_params_read() {
    let profile = decode("trojan://p%40ss@host:443?sni=example.com&fp=safari&alpn=h2").unwrap();
    assert_eq!(profile.password(), Some("p@ss"));
    assert_eq!(profile.tls.server_name, "example.com");
    assert_eq!(profile.tls.fingerprint, "safari");
    assert_eq!(profile.tls.alpn, "h2");
}

#[test]
fn unsupported_scheme() {
    let err = decode("ftp://host").unwrap_err();
    assert_eq!(err, DecodeError::UnsupportedProtocol("ftp".to_string()));
    assert!(matches!(
        decode("hysteria2://h:443"),
        Err(DecodeError::UnsupportedProtocol(_))
    ));
}

#[test]
fn garbage_is_uri_error() {
    assert!(matches!(decode("not a link"), Err(DecodeError::UriInvalid(_))));
}

// =============================================================================
// Xray documents
// =============================================================================

#[test]
fn xray_vless_outbound_shape() {
    let doc = render(VLESS_LINK, Target::Xray);

    let inbounds = doc["inbounds"].as_array().unwrap();
    assert_eq!(inbounds.len(), 1);
    assert_eq!(
        inbounds[0],
        json!({
            "port": 1080,
            "listen": "127.0.0.1",
            "protocol": "socks",
            "settings": {"auth": "noauth", "udp": true},
            "tag": "socks-inbound"
        })
    );

    let outbounds = doc["outbounds"].as_array().unwrap();
    assert_eq!(outbounds.len(), 1);
    let out = &outbounds[0];
    assert_eq!(out["protocol"], "vless");
    assert_eq!(out["tag"], "vless-outbound");
    assert_eq!(
        out["settings"],
        json!({"vnext": [{
            "address": "host",
            "port": 443,
            "users": [{"id": "uuid", "encryption": "none", "level": 0}]
        }]})
    );
    assert_eq!(
        out["streamSettings"],
        json!({
            "network": "tcp",
            "security": "tls",
            "tlsSettings": {
                "serverName": "s",
                "fingerprint": "chrome",
                "alpn": ["h3", "h2", "http/1.1"],
                "allowInsecure": true
            },
            "tcpSettings": {"header": {
                "type": "http",
                "request": {"path": ["/p"], "headers": {"Host": ["h"]}}
            }}
        })
    );
}

#[test]
fn xray_allow_insecure_false_unless_one() {
    let doc = render("vless://u@h:443?allowInsecure=yes", Target::Xray);
    assert_eq!(
        doc["outbounds"][0]["streamSettings"]["tlsSettings"]["allowInsecure"],
        false
    );
}

#[test]
fn xray_vmess_uses_vnext_and_default_header_path() {
    let doc = render(
        &vmess_link(r#"{"id":"u","add":"h","port":"443"}"#),
        Target::Xray,
    );
    let out = &doc["outbounds"][0];
    assert_eq!(out["protocol"], "vmess");
    assert_eq!(out["tag"], "vmess-outbound");
    assert_eq!(out["settings"]["vnext"][0]["users"][0]["id"], "u");
    let request = &out["streamSettings"]["tcpSettings"]["header"]["request"];
    assert_eq!(request["path"], json!(["/"]));
    assert!(request.get("headers").is_none());
    assert!(out["streamSettings"]["tlsSettings"].get("serverName").is_none());
}

#[test]
fn xray_shadowsocks_has_no_stream_settings() {
    let doc = render(&ss_link("aes-256-gcm:secret", "host:8388"), Target::Xray);
    let out = &doc["outbounds"][0];
    assert_eq!(out["protocol"], "shadowsocks");
    assert_eq!(out["tag"], "shadowsocks-outbound");
    assert_eq!(
        out["settings"],
        json!({"servers": [{
            "address": "host", "port": 8388, "method": "aes-256-gcm", "password": "secret"
        }]})
    );
    assert!(out.get("streamSettings").is_none());
}

#[test]
fn xray_trojan_has_tls_without_camouflage() {
    let doc = render("trojan://pw@host:443?sni=sni.example.com", Target::Xray);
    let out = &doc["outbounds"][0];
    assert_eq!(out["protocol"], "trojan");
    assert_eq!(out["tag"], "trojan-outbound");
    assert_eq!(
        out["settings"],
        json!({"servers": [{"address": "host", "port": 443, "password": "pw"}]})
    );
    assert_eq!(out["streamSettings"]["security"], "tls");
    assert_eq!(
        out["streamSettings"]["tlsSettings"]["serverName"],
        "sni.example.com"
    );
    assert!(out["streamSettings"].get("tcpSettings").is_none());
}

// =============================================================================
// sing-box documents
// =============================================================================

#[test]
fn singbox_vmess_outbound_shape() {
    let link = vmess_link(
        r#"{"id":"u","add":"h","port":"443","net":"ws","path":"/ws","host":"cdn","tls":"tls","sni":"s","alpn":"h2, http/1.1","fp":"chrome"}"#,
    );
    let doc = render(&link, Target::Singbox);

    assert_eq!(doc["log"], json!({"level": "error"}));
    assert_eq!(
        doc["inbounds"],
        json!([{
            "type": "mixed",
            "tag": "mixed-in",
            "listen": "::",
            "listen_port": 2080,
            "sniff": true,
            "sniff_override_destination": false
        }])
    );
    assert_eq!(
        doc["outbounds"],
        json!([{
            "type": "vmess",
            "tag": "vmess-out",
            "server": "h",
            "server_port": 443,
            "uuid": "u",
            "security": "auto",
            "alter_id": 0,
            "tls": {
                "enabled": true,
                "server_name": "s",
                "insecure": false,
                "alpn": ["h2", "http/1.1"],
                "utls": {"enabled": true, "fingerprint": "chrome"}
            },
            "transport": {"type": "ws", "path": "/ws", "headers": {"Host": "cdn"}}
        }])
    );
}

#[test]
fn singbox_vless_flow_and_reality() {
    let link = "vless://u@h:443?security=tls&pbk=key&sid=ab&type=tcp&allowInsecure=1";
    let doc = render(link, Target::Singbox);
    let out = &doc["outbounds"][0];
    assert_eq!(out["type"], "vless");
    assert_eq!(out["tag"], "vless-out");
    assert_eq!(out["flow"], "tls");
    assert_eq!(out["network"], "tcp");
    assert_eq!(out["tls"]["insecure"], true);
    assert_eq!(
        out["tls"]["reality"],
        json!({"enabled": false, "public_key": "key", "short_id": "ab"})
    );
    assert!(out.get("transport").is_none());
}

#[test]
fn singbox_grpc_transport_uses_service_name() {
    let doc = render(
        "vless://u@h:443?type=grpc&serviceName=svc",
        Target::Singbox,
    );
    assert_eq!(
        doc["outbounds"][0]["transport"],
        json!({"type": "grpc", "service_name": "svc"})
    );
    assert!(doc["outbounds"][0].get("network").is_none());
}

#[test]
fn singbox_shadowsocks_has_no_tls() {
    let link = ss_link(
        "aes-256-gcm:secret",
        "host:8388/?plugin=obfs-local%3Bobfs%3Dhttp",
    );
    let doc = render(&link, Target::Singbox);
    assert_eq!(
        doc["outbounds"],
        json!([{
            "type": "shadowsocks",
            "tag": "shadowsocks-out",
            "server": "host",
            "server_port": 8388,
            "method": "aes-256-gcm",
            "password": "secret",
            "plugin": "obfs-local",
            "plugin_opts": "obfs=http"
        }])
    );
}

#[test]
fn singbox_trojan_tls_shaping() {
    let doc = render(
        "trojan://pw@host:443?sni=example.com&fp=firefox&alpn=h2",
        Target::Singbox,
    );
    let out = &doc["outbounds"][0];
    assert_eq!(out["type"], "trojan");
    assert_eq!(out["tag"], "trojan-out");
    assert_eq!(out["password"], "pw");
    assert_eq!(
        out["tls"],
        json!({
            "enabled": true,
            "server_name": "example.com",
            "insecure": false,
            "alpn": ["h2"],
            "utls": {"enabled": true, "fingerprint": "firefox"}
        })
    );
}

// =============================================================================
// Cross-cutting properties
// =============================================================================

#[test]
fn every_protocol_round_trips_through_both_targets() {
    let options = SynthesisOptions::default();
    for link in sample_links() {
        let profile = decode(&link).unwrap();

        let xray_bytes = synthesize(&profile, Target::Xray, &options).unwrap();
        let xray: XrayDocument = serde_json::from_slice(&xray_bytes).unwrap();
        assert_eq!(xray, Xray::build(&profile, &options).unwrap());
        assert_eq!(xray.inbounds.len(), 1);
        assert_eq!(xray.outbounds.len(), 1);

        let singbox_bytes = synthesize(&profile, Target::Singbox, &options).unwrap();
        let singbox: SingboxDocument = serde_json::from_slice(&singbox_bytes).unwrap();
        assert_eq!(singbox, Singbox::build(&profile, &options).unwrap());
        assert_eq!(singbox.inbounds.len(), 1);
        assert_eq!(singbox.outbounds.len(), 1);
        assert_eq!(
            singbox.outbounds[0].tag(),
            format!("{}-out", profile.protocol.name())
        );
    }
}

#[test]
fn round_trip_keeps_settings_variant() {
    let options = SynthesisOptions::default();
    let profile = decode("trojan://pw@host:443").unwrap();
    let bytes = synthesize(&profile, Target::Xray, &options).unwrap();
    let doc: XrayDocument = serde_json::from_slice(&bytes).unwrap();
    assert!(matches!(
        doc.outbounds[0].settings,
        OutboundSettings::Trojan(_)
    ));

    let profile = decode("vless://u@h:443?type=httpupgrade&host=cdn&path=/up").unwrap();
    let doc = Singbox::build(&profile, &options).unwrap();
    match &doc.outbounds[0] {
        SingboxOutbound::VLess(out) => assert_eq!(
            out.transport,
            Some(V2RayTransport::HttpUpgrade {
                host: "cdn".to_string(),
                path: "/up".to_string()
            })
        ),
        other => panic!("unexpected outbound {:?}", other),
    }
}

#[test]
fn synthesis_is_idempotent() {
    let options = SynthesisOptions::default();
    for link in sample_links() {
        let profile = decode(&link).unwrap();
        for target in Target::ALL {
            assert_eq!(
                synthesize(&profile, target, &options).unwrap(),
                synthesize(&profile, target, &options).unwrap()
            );
        }
    }
}

#[test]
fn output_is_two_space_indented() {
    let profile = decode("trojan://pw@host:443").unwrap();
    let options = SynthesisOptions::default();
    let xray = String::from_utf8(synthesize(&profile, Target::Xray, &options).unwrap()).unwrap();
    assert!(xray.starts_with("{\n  \"inbounds\": [\n    {"));
    let singbox =
        String::from_utf8(synthesize(&profile, Target::Singbox, &options).unwrap()).unwrap();
    assert!(singbox.starts_with("{\n  \"log\": {\n    \"level\": \"error\""));
}

#[test]
fn decoded_port_reused_for_every_target() {
    let options = SynthesisOptions::default();
    let profile = decode(&ss_link("aes-256-gcm:secret", "host:9999")).unwrap();
    let xray = json_of(&synthesize(&profile, Target::Xray, &options).unwrap());
    let singbox = json_of(&synthesize(&profile, Target::Singbox, &options).unwrap());
    assert_eq!(xray["outbounds"][0]["settings"]["servers"][0]["port"], 9999);
    assert_eq!(singbox["outbounds"][0]["server_port"], 9999);
}

#[test]
fn remote_port_override_applies_uniformly() {
    let options = SynthesisOptions {
        remote_port: Some(8443),
        ..SynthesisOptions::default()
    };
    for link in sample_links() {
        let profile = decode(&link).unwrap();
        let xray = Xray::build(&profile, &options).unwrap();
        let port = match &xray.outbounds[0].settings {
            OutboundSettings::VNext(s) => s.vnext[0].port,
            OutboundSettings::Shadowsocks(s) => s.servers[0].port,
            OutboundSettings::Trojan(s) => s.servers[0].port,
        };
        assert_eq!(port, 8443);

        let singbox = json_of(&synthesize(&profile, Target::Singbox, &options).unwrap());
        assert_eq!(singbox["outbounds"][0]["server_port"], 8443);
    }
}

#[test]
fn custom_inbound_options() {
    let options = SynthesisOptions {
        xray: XrayInboundOptions {
            listen: "0.0.0.0".to_string(),
            port: 10808,
            udp: false,
        },
        singbox: SingboxInboundOptions {
            listen: "127.0.0.1".to_string(),
            port: 7890,
            sniff: false,
            log_level: "warn".to_string(),
        },
        remote_port: None,
    };
    let profile = decode("trojan://pw@host:443").unwrap();

    let xray = Xray::build(&profile, &options).unwrap();
    assert_eq!(xray.inbounds[0].port, 10808);
    assert_eq!(xray.inbounds[0].listen, "0.0.0.0");
    assert!(!xray.inbounds[0].settings.udp);

    let singbox = Singbox::build(&profile, &options).unwrap();
    assert_eq!(singbox.log.level, "warn");
    assert_eq!(singbox.inbounds[0].listen_port, 7890);
    assert!(!singbox.inbounds[0].sniff);
}

#[test]
fn vmess_bad_port_fails_only_at_synthesis() {
    let link = vmess_link(r#"{"id":"u","add":"h"}"#);
    let rendered = convert(&link, &Target::ALL, &SynthesisOptions::default()).unwrap();
    assert_eq!(rendered.len(), 2);
    for r in rendered {
        assert!(matches!(r.document, Err(SynthesisError::InvalidPort(_))));
    }

    let profile = decode(&vmess_link(r#"{"id":"u","add":"h","port":"https"}"#)).unwrap();
    assert!(matches!(
        synthesize(&profile, Target::Singbox, &SynthesisOptions::default()),
        Err(SynthesisError::InvalidPort(_))
    ));
}

#[test]
fn out_of_range_ports_rejected() {
    let options = SynthesisOptions::default();
    for port in ["0", "65536", "-1"] {
        let profile = ConnectionProfile::new(
            Protocol::Trojan,
            "h",
            port,
            Identity::Password("pw".to_string()),
        );
        assert!(matches!(
            Xray::build(&profile, &options),
            Err(SynthesisError::InvalidPort(_))
        ));
    }
}

#[test]
fn zero_port_override_names_the_override() {
    let options = SynthesisOptions {
        remote_port: Some(0),
        ..SynthesisOptions::default()
    };
    let profile = decode("trojan://pw@host:443").unwrap();
    assert_eq!(
        Xray::build(&profile, &options).unwrap_err(),
        SynthesisError::InvalidPort("\"0\" is not in 1-65535".to_string())
    );

    let profile = ConnectionProfile::new(
        Protocol::Trojan,
        "h",
        "70000",
        Identity::Password("pw".to_string()),
    );
    assert_eq!(
        Singbox::build(&profile, &SynthesisOptions::default()).unwrap_err(),
        SynthesisError::InvalidPort("\"70000\" is not in 1-65535".to_string())
    );
}

#[test]
fn mismatched_identity_rejected() {
    let profile = ConnectionProfile::new(
        Protocol::VMess,
        "h",
        "443",
        Identity::Password("pw".to_string()),
    );
    let options = SynthesisOptions::default();
    for target in Target::ALL {
        assert!(matches!(
            synthesize(&profile, target, &options),
            Err(SynthesisError::IdentityMismatch(_))
        ));
    }
}

#[test]
fn convert_reports_decode_errors() {
    let err = convert("ftp://host", &Target::ALL, &SynthesisOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedProtocol(_)));
}

// =============================================================================
// Options, enums and errors
// =============================================================================

#[test]
fn options_default_values() {
    let options = SynthesisOptions::default();
    assert_eq!(options.xray.listen, "127.0.0.1");
    assert_eq!(options.xray.port, 1080);
    assert!(options.xray.udp);
    assert_eq!(options.singbox.listen, "::");
    assert_eq!(options.singbox.port, 2080);
    assert!(options.singbox.sniff);
    assert_eq!(options.singbox.log_level, "error");
    assert_eq!(options.remote_port, None);
}

#[test]
fn options_partial_struct_fills_defaults() {
    assert_de_tokens(
        &XrayInboundOptions {
            port: 1081,
            ..XrayInboundOptions::default()
        },
        &[
            Token::Struct {
                name: "XrayInboundOptions",
                len: 1,
            },
            Token::Str("port"),
            Token::U16(1081),
            Token::StructEnd,
        ],
    );
}

#[test]
fn options_from_json() {
    let options = SynthesisOptions::from_json(r#"{"xray":{"udp":false},"remote_port":443}"#).unwrap();
    assert!(!options.xray.udp);
    assert_eq!(options.xray.port, 1080);
    assert_eq!(options.remote_port, Some(443));
    assert_eq!(options.singbox, SingboxInboundOptions::default());
    assert!(SynthesisOptions::from_json(r#"{"remote_port":"x"}"#).is_err());
}

#[test]
fn protocol_serde_names() {
    assert_tokens(
        &Protocol::VLess,
        &[Token::UnitVariant {
            name: "Protocol",
            variant: "vless",
        }],
    );
    assert_tokens(
        &Protocol::Shadowsocks,
        &[Token::UnitVariant {
            name: "Protocol",
            variant: "shadowsocks",
        }],
    );
}

#[test]
fn protocol_names_and_schemes() {
    let schemes: Vec<_> = Protocol::ALL.iter().map(Protocol::scheme).collect();
    assert_eq!(schemes, vec!["vmess", "vless", "ss", "trojan"]);
    assert_eq!(Protocol::Shadowsocks.to_string(), "shadowsocks");
}

#[test]
fn identity_matches_protocol() {
    let uuid = Identity::Uuid("u".to_string());
    assert!(uuid.matches(Protocol::VMess));
    assert!(uuid.matches(Protocol::VLess));
    assert!(!uuid.matches(Protocol::Trojan));
    let ss = Identity::MethodPassword {
        method: "m".to_string(),
        password: "p".to_string(),
    };
    assert!(ss.matches(Protocol::Shadowsocks));
    assert_eq!(ss.password(), Some("p"));
    assert_eq!(ss.uuid(), None);
}

#[test]
fn target_from_str() {
    assert_eq!("xray".parse::<Target>(), Ok(Target::Xray));
    assert_eq!("Sing-Box".parse::<Target>(), Ok(Target::Singbox));
    assert_eq!("singbox".parse::<Target>(), Ok(Target::Singbox));
    assert!("clash".parse::<Target>().is_err());
    assert_eq!(Target::Singbox.to_string(), "singbox");
}

#[test]
fn error_display_and_std_error() {
    let e = DecodeError::UnsupportedProtocol("ftp".to_string());
    assert_eq!(e.to_string(), "Unsupported protocol: ftp");
    let e = SynthesisError::InvalidPort("\"x\"".to_string());
    assert!(e.to_string().starts_with("Invalid port"));
    fn assert_error<E: std::error::Error>() {}
    assert_error::<DecodeError>();
    assert_error::<SynthesisError>();
}

#[test]
fn error_from_impls() {
    let err = base64::engine::general_purpose::STANDARD
        .decode("!!!")
        .unwrap_err();
    assert!(matches!(DecodeError::from(err), DecodeError::Base64Invalid(_)));

    let err = url::Url::parse("no scheme").unwrap_err();
    assert!(matches!(DecodeError::from(err), DecodeError::UriInvalid(_)));

    let err = serde_json::from_str::<Value>("{").unwrap_err();
    assert!(matches!(
        SynthesisError::from(err),
        SynthesisError::Serialization(_)
    ));
}
