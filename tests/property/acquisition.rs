// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of address carving and VPC acquisition

use proptest::prelude::*;
use std::net::Ipv4Addr;

use infra_etl_network::construct::Stack;
use infra_etl_network::context::DeploymentContext;
use infra_etl_network::domain::{CidrBlock, ResourceType, SubnetMask};
use infra_etl_network::errors::StackError;
use infra_etl_network::policy::VpcAcquisitionPolicy;
use infra_etl_network::vpc::{create_vpc, CreateConfig};
use infra_etl_network::Template;

// ============================================================================
// Strategies
// ============================================================================

/// VPC blocks with a /16 to /24 prefix and host bits cleared
fn vpc_block_strategy() -> impl Strategy<Value = CidrBlock> {
    (any::<u32>(), 16u8..=24).prop_map(|(raw, prefix)| {
        let network = raw & (u32::MAX << (32 - u32::from(prefix)));
        CidrBlock::from_parts(Ipv4Addr::from(network), prefix)
            .expect("host bits are cleared")
    })
}

/// A block with a mask leaving room for at least three subnets
fn block_and_mask_strategy() -> impl Strategy<Value = (CidrBlock, u8)> {
    vpc_block_strategy().prop_flat_map(|block| {
        let min_mask = block.prefix_length() + 2;
        (Just(block), min_mask..=SubnetMask::MAX)
    })
}

fn zone_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("test-1{}", (b'a' + i as u8) as char)).collect()
}

// ============================================================================
// Carving
// ============================================================================

proptest! {
    #[test]
    fn prop_carved_subnets_are_disjoint_and_contained(
        (block, mask) in block_and_mask_strategy(),
        count in 1usize..=4,
    ) {
        let subnets = block.carve(SubnetMask::new(mask).unwrap(), count).unwrap();

        prop_assert_eq!(subnets.len(), count);
        for (i, subnet) in subnets.iter().enumerate() {
            prop_assert!(block.contains(subnet));
            prop_assert_eq!(subnet.prefix_length(), mask);
            for other in &subnets[i + 1..] {
                prop_assert!(!subnet.overlaps(other));
            }
        }
    }

    #[test]
    fn prop_carving_past_capacity_fails((block, mask) in block_and_mask_strategy()) {
        let mask = SubnetMask::new(mask).unwrap();
        let capacity = block.capacity(mask).unwrap() as usize;
        prop_assert!(block.carve(mask, capacity + 1).is_err());
    }
}

// ============================================================================
// Acquisition
// ============================================================================

proptest! {
    #[test]
    fn prop_subnet_count_equals_max_azs(
        (block, mask) in block_and_mask_strategy(),
        max_azs in 3u32..=4,
    ) {
        let mut stack = Stack::new(
            "prop",
            DeploymentContext::pinned("test-1", zone_names(max_azs as usize)),
        )
        .unwrap();
        let config = CreateConfig::new(block.to_string(), mask).with_max_azs(max_azs);
        let vpc = create_vpc(&mut stack, &config).unwrap();

        prop_assert_eq!(vpc.subnets().len(), max_azs as usize);
        for (i, subnet) in vpc.subnets().iter().enumerate() {
            prop_assert_eq!(&subnet.group_name, &format!("private{}", i));
        }
    }

    #[test]
    fn prop_deferred_zones_scale_to_max_azs(max_azs in 3u32..=6) {
        let mut stack = Stack::new("prop", DeploymentContext::agnostic()).unwrap();
        VpcAcquisitionPolicy::new()
            .resolve(&mut stack, CreateConfig::new("10.0.0.0/16", 24).with_max_azs(max_azs).into())
            .unwrap();

        let template = Template::from_stack(&stack);
        prop_assert_eq!(template.resource_count(ResourceType::Subnet), max_azs as usize);
        prop_assert_eq!(
            template.resource_count(ResourceType::SubnetNetworkAclAssociation),
            max_azs as usize
        );
    }

    #[test]
    fn prop_max_azs_below_three_always_fails(
        (block, mask) in block_and_mask_strategy(),
        max_azs in 0u32..3,
    ) {
        let mut stack = Stack::new("prop", DeploymentContext::agnostic()).unwrap();
        let result = create_vpc(
            &mut stack,
            &CreateConfig::new(block.to_string(), mask).with_max_azs(max_azs),
        );

        prop_assert!(matches!(result, Err(StackError::InvalidValue(_))));
        prop_assert!(stack.is_empty());
    }
}
