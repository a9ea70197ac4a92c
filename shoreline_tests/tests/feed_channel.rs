//! Peer feed delivered as encoded wire messages from another task.

use std::time::Duration;

use shoreline_shared::{
    config::GameConfig,
    math::Rgb,
    net::{
        decode_from_bytes, encode_to_bytes, PeerAnnounce, PeerAppearance, PeerId, PositionSample,
        WireMsg,
    },
    world::MoveIntent,
};
use shoreline_tests::{init_tracing, seeded_client};

fn wire_script() -> Vec<WireMsg> {
    let id = PeerId::new("remote");
    vec![
        WireMsg::Announce(PeerAnnounce {
            id: id.clone(),
            appearance: PeerAppearance {
                colors: Rgb::new(0.1, 0.6, 0.3),
                silhouette: vec![0.5, 0.6, 0.5],
            },
            sample: PositionSample::new(1_000.0, 0.0),
        }),
        WireMsg::Position {
            id: id.clone(),
            sample: PositionSample::new(1_100.0, 0.02),
        },
        WireMsg::Position {
            id: id.clone(),
            sample: PositionSample::new(1_200.0, 0.04),
        },
        WireMsg::Leave { id },
    ]
}

#[tokio::test]
async fn encoded_feed_drives_interpolation() -> anyhow::Result<()> {
    init_tracing();
    let (mut client, tx) = seeded_client(GameConfig::default(), 21, 0.3);

    let mut script = wire_script();
    let leave = script.pop().expect("script ends with a leave");

    let producer = tokio::spawn(async move {
        for msg in script {
            let bytes = encode_to_bytes(&msg)?;
            tx.send(decode_from_bytes(&bytes)?.into_event()).await?;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        Ok::<_, anyhow::Error>(tx)
    });
    let tx = producer.await??;

    // now 1_300 - 150 delay = server time 1_150, halfway through the second pair.
    let summary = client.tick_at(1_300.0, MoveIntent::Idle);
    assert_eq!(summary.events_applied, 3);

    let peers = client.renderable_peers();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].id, PeerId::new("remote"));
    assert!((peers[0].position - 0.03).abs() < 1e-12);
    assert_eq!(peers[0].colors, Rgb::new(0.1, 0.6, 0.3));

    let record = client.peers().get(&PeerId::new("remote")).unwrap();
    let times: Vec<f64> = record.samples().iter().map(|s| s.server_time).collect();
    assert_eq!(times, vec![1_100.0, 1_200.0]);

    tx.send(leave.into_event()).await?;
    client.tick_at(1_316.0, MoveIntent::Idle);
    assert!(client.renderable_peers().is_empty());
    Ok(())
}

#[tokio::test]
async fn silent_peer_freezes_at_last_estimate() -> anyhow::Result<()> {
    let (mut client, tx) = seeded_client(GameConfig::default(), 22, 0.0);
    for msg in wire_script().into_iter().take(3) {
        tx.send(msg.into_event()).await?;
    }

    for now in [1_400.0, 2_000.0, 60_000.0] {
        client.tick_at(now, MoveIntent::Idle);
        assert_eq!(client.renderable_peers()[0].position, 0.04);
    }
    Ok(())
}
